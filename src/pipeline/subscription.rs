// std
use std::sync::Weak;
// self
use crate::_prelude::*;

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
	next_id: u64,
	callbacks: BTreeMap<u64, Callback>,
}

/// Registry of `on_unauthenticated` callbacks.
#[derive(Clone, Default)]
pub(crate) struct Listeners(Arc<Mutex<ListenerTable>>);
impl Listeners {
	pub(crate) fn subscribe(&self, callback: Callback) -> Subscription {
		let mut table = self.0.lock();
		let id = table.next_id;

		table.next_id += 1;
		table.callbacks.insert(id, callback);

		Subscription { id, table: Some(Arc::downgrade(&self.0)) }
	}

	/// Invokes every callback once, in registration order, and returns how many ran.
	pub(crate) fn notify(&self) -> usize {
		// Callbacks may subscribe or unsubscribe, so run them outside the lock.
		let callbacks = self.0.lock().callbacks.values().cloned().collect::<Vec<_>>();

		for callback in &callbacks {
			callback();
		}

		callbacks.len()
	}

	pub(crate) fn len(&self) -> usize {
		self.0.lock().callbacks.len()
	}
}
impl Debug for Listeners {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Listeners").field("len", &self.len()).finish()
	}
}

/// Handle returned by [`AuthPipeline::on_unauthenticated`].
///
/// Dropping the handle removes the callback. Call [`Subscription::detach`] to keep the callback
/// registered for the lifetime of the pipeline.
///
/// [`AuthPipeline::on_unauthenticated`]: crate::pipeline::AuthPipeline::on_unauthenticated
#[must_use = "dropping a Subscription immediately unsubscribes the callback"]
#[derive(Debug)]
pub struct Subscription {
	id: u64,
	table: Option<Weak<Mutex<ListenerTable>>>,
}
impl Subscription {
	/// Removes the callback now.
	pub fn unsubscribe(mut self) {
		self.remove();
	}

	/// Keeps the callback registered without holding the handle.
	pub fn detach(mut self) {
		self.table = None;
	}

	fn remove(&mut self) {
		if let Some(table) = self.table.take().and_then(|table| table.upgrade()) {
			table.lock().callbacks.remove(&self.id);
		}
	}
}
impl Drop for Subscription {
	fn drop(&mut self) {
		self.remove();
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	fn counter() -> (Arc<AtomicUsize>, Callback) {
		let count = Arc::new(AtomicUsize::new(0));
		let hits = count.clone();
		let callback: Callback = Arc::new(move || {
			hits.fetch_add(1, Ordering::SeqCst);
		});

		(count, callback)
	}

	#[test]
	fn dropping_the_handle_unsubscribes() {
		let listeners = Listeners::default();
		let (count, callback) = counter();
		let subscription = listeners.subscribe(callback);

		assert_eq!(listeners.notify(), 1);

		drop(subscription);

		assert_eq!(listeners.notify(), 0);
		assert_eq!(count.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn detached_callbacks_stay_registered() {
		let listeners = Listeners::default();
		let (count, callback) = counter();

		listeners.subscribe(callback).detach();
		listeners.notify();
		listeners.notify();

		assert_eq!(count.load(Ordering::SeqCst), 2);
		assert_eq!(listeners.len(), 1);
	}

	#[test]
	fn handles_outliving_the_registry_are_inert() {
		let listeners = Listeners::default();
		let (_, callback) = counter();
		let subscription = listeners.subscribe(callback);

		drop(listeners);
		subscription.unsubscribe();
	}
}
