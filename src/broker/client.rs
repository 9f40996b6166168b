use crate::utils::Result;

/// Requests the relay issues against the broker connection.
///
/// Every method must return without waiting on the network: the relay calls
/// them from its single event loop. Delivery is best effort, an `Ok` only
/// means the request was handed to the transport.
pub trait BrokerClient: Send + 'static {
    /// Subscribes to `topic`. Subscribing a topic that is already subscribed
    /// is a no-op.
    fn subscribe(&mut self, topic: &str) -> Result<()>;

    /// Drops every active subscription. A no-op when there are none.
    fn unsubscribe_all(&mut self) -> Result<()>;

    /// Publishes `payload` to `topic`, fire-and-forget.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()>;

    /// Re-issues every active subscription on a fresh broker session.
    fn resubscribe_all(&mut self) -> Result<()>;
}
