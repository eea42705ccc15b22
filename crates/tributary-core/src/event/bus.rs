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


/// Manages a generic, thread-safe event channel.
///
/// This EventBus is generic over the type `T` of event it transports, keeping
/// `tributary-core` decoupled from the concrete records defined by the
/// pipeline and telemetry crates.
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + Sync + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> EventBus<T> {
    /// Creates a new EventBus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("EventBus initialized.");
        Self { sender, receiver }
    }

    /// Sends an event, logging an error if every receiver is gone.
    pub fn publish(&self, event: T) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to send event: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sending end, for producers living elsewhere.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns the receiving end, intended for the owner of the bus.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }

    /// Takes every event currently queued without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
