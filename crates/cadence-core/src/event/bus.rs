// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Manages a generic, bounded event channel.
///
/// The bus is generic over the event type `T`, so `cadence-core` stays
/// decoupled from what higher-level crates choose to publish. Publishing
/// never blocks: when the buffer is full the event is dropped, since
/// observers are expected to drain it at their own pace.
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    /// Default number of buffered events.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Creates a bus with [`Self::DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a bus buffering at most `capacity` undelivered events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = flume::bounded(capacity.max(1));
        log::trace!("EventBus initialized with capacity {capacity}.");
        Self { sender, receiver }
    }

    /// Publishes an event, dropping it if the buffer is full.
    ///
    /// Returns `true` if the event was queued.
    pub fn publish(&self, event: T) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(flume::TrySendError::Full(_)) => {
                log::trace!("EventBus full; dropping event.");
                false
            }
            Err(flume::TrySendError::Disconnected(_)) => {
                log::error!("Failed to send event: receiver disconnected.");
                false
            }
        }
    }

    /// Returns a clone of the sender end of the channel.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns a clone of the receiver end of the channel.
    ///
    /// Every clone competes for the same events.
    pub fn receiver(&self) -> flume::Receiver<T> {
        self.receiver.clone()
    }

    /// Discards every buffered event and returns how many were dropped.
    pub fn clear(&self) -> usize {
        self.receiver.drain().count()
    }
}

impl<T: Clone + Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flume::TryRecvError;
    use std::thread;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Started,
        Ticked(u64),
    }

    #[test]
    fn publish_and_receive_in_order() {
        let bus = EventBus::<TestEvent>::new();
        let receiver = bus.receiver();

        assert!(bus.publish(TestEvent::Started));
        assert!(bus.publish(TestEvent::Ticked(1)));

        assert_eq!(receiver.try_recv(), Ok(TestEvent::Started));
        assert_eq!(receiver.try_recv(), Ok(TestEvent::Ticked(1)));
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn full_bus_drops_instead_of_blocking() {
        let bus = EventBus::<TestEvent>::with_capacity(2);
        assert!(bus.publish(TestEvent::Ticked(1)));
        assert!(bus.publish(TestEvent::Ticked(2)));
        assert!(!bus.publish(TestEvent::Ticked(3)));
        assert_eq!(bus.clear(), 2);
        assert!(bus.publish(TestEvent::Ticked(4)));
    }

    #[test]
    fn receiver_can_drain_from_another_thread() {
        let bus = EventBus::<TestEvent>::new();
        let receiver = bus.receiver();
        bus.publish(TestEvent::Ticked(7));

        let handle = thread::spawn(move || receiver.recv_timeout(Duration::from_secs(1)));
        let received = handle.join().expect("Thread join failed");
        assert_eq!(received, Ok(TestEvent::Ticked(7)));
    }
}
