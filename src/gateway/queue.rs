//! Refresh-in-progress flag and the FIFO queue of callers waiting on it.
//!
//! Both live behind one synchronous lock so checking and setting the flag never spans an
//! `.await`. The caller that wins the flag receives a [`RefreshLease`]; releasing (or
//! dropping) the lease clears the flag and resumes every queued waiter in enqueue order.

// std
use std::collections::VecDeque;
// crates.io
use futures::channel::oneshot;
// self
use crate::{
	_prelude::*,
	obs::{self, RefreshStage},
};

pub(crate) type SharedRefreshQueue = Arc<Mutex<RefreshQueue>>;

#[derive(Debug, Default)]
pub(crate) struct RefreshQueue {
	in_progress: bool,
	waiters: VecDeque<Waiter>,
	next_ticket: u64,
}
impl RefreshQueue {
	pub(crate) fn is_refreshing(&self) -> bool {
		self.in_progress
	}

	pub(crate) fn waiting(&self) -> usize {
		self.waiters.len()
	}

	/// Clears the flag and resolves every waiter front to back, returning their tickets.
	fn settle(&mut self) -> Vec<u64> {
		self.in_progress = false;

		self.waiters
			.drain(..)
			.map(|waiter| {
				// A waiter whose future was dropped has nothing left to resume.
				let _ = waiter.resume.send(());

				waiter.ticket
			})
			.collect()
	}
}

#[derive(Debug)]
struct Waiter {
	ticket: u64,
	resume: oneshot::Sender<()>,
}

/// Result of asking to refresh.
pub(crate) enum Admission {
	/// The caller owns the refresh and must release the lease once it settles.
	Lead(RefreshLease),
	/// A refresh is already in flight; `resume` resolves when it settles.
	Wait {
		/// Number of callers queued ahead of this one.
		ahead: usize,
		/// Completion handle.
		resume: oneshot::Receiver<()>,
	},
}

/// Either claims the refresh flag or enqueues the caller behind the in-flight refresh.
///
/// `path` names the request that hit the authorization failure; a leading caller keeps it
/// on the lease for lifecycle events.
pub(crate) fn admit(state: &SharedRefreshQueue, path: &str) -> Admission {
	let mut queue = state.lock();

	if queue.in_progress {
		let (resume_tx, resume_rx) = oneshot::channel();
		let ticket = queue.next_ticket;
		let ahead = queue.waiters.len();

		queue.next_ticket += 1;
		queue.waiters.push_back(Waiter { ticket, resume: resume_tx });

		Admission::Wait { ahead, resume: resume_rx }
	} else {
		queue.in_progress = true;

		let lease = RefreshLease { state: state.clone(), path: path.to_owned(), released: false };

		Admission::Lead(lease)
	}
}

/// Ownership of the refresh flag. Dropping an unreleased lease still clears the flag and
/// resumes the queue, so a cancelled refresh never strands its waiters.
#[derive(Debug)]
pub(crate) struct RefreshLease {
	state: SharedRefreshQueue,
	path: String,
	released: bool,
}
impl RefreshLease {
	/// Request path that started this refresh.
	pub(crate) fn path(&self) -> &str {
		&self.path
	}

	/// Clears the flag and resumes all waiters, returning their tickets in resume order.
	pub(crate) fn release(mut self) -> Vec<u64> {
		self.released = true;

		self.state.lock().settle()
	}
}
impl Drop for RefreshLease {
	fn drop(&mut self) {
		if self.released {
			return;
		}

		let resumed = self.state.lock().settle();

		obs::record_refresh_stage(RefreshStage::Abandoned, &self.path, resumed.len());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn expect_lead(admission: Admission) -> RefreshLease {
		match admission {
			Admission::Lead(lease) => lease,
			Admission::Wait { .. } => panic!("Expected to lead the refresh."),
		}
	}

	fn expect_wait(admission: Admission) -> (usize, oneshot::Receiver<()>) {
		match admission {
			Admission::Wait { ahead, resume } => (ahead, resume),
			Admission::Lead(_) => panic!("Expected to wait behind the in-flight refresh."),
		}
	}

	#[test]
	fn only_the_first_caller_leads() {
		let state = SharedRefreshQueue::default();
		let lease = expect_lead(admit(&state, "/cart"));
		let (first_ahead, _rx_a) = expect_wait(admit(&state, "/cart"));
		let (second_ahead, _rx_b) = expect_wait(admit(&state, "/cart"));

		assert!(state.lock().is_refreshing());
		assert_eq!(state.lock().waiting(), 2);
		assert_eq!((first_ahead, second_ahead), (0, 1));
		assert_eq!(lease.release(), vec![0, 1]);
	}

	#[test]
	fn release_resumes_waiters_in_enqueue_order() {
		let state = SharedRefreshQueue::default();
		let lease = expect_lead(admit(&state, "/cart"));
		let mut receivers =
			(0..3).map(|_| expect_wait(admit(&state, "/cart")).1).collect::<Vec<_>>();
		let resumed = lease.release();

		assert_eq!(resumed, vec![0, 1, 2]);
		assert!(!state.lock().is_refreshing());
		assert_eq!(state.lock().waiting(), 0);

		for receiver in &mut receivers {
			assert_eq!(receiver.try_recv().expect("Waiter should not be cancelled."), Some(()));
		}

		// The next caller starts a fresh cycle.
		let next = expect_lead(admit(&state, "/cart"));

		assert!(next.release().is_empty());
	}

	#[test]
	fn dropped_lease_still_clears_flag_and_resumes_waiters() {
		let state = SharedRefreshQueue::default();
		let lease = expect_lead(admit(&state, "/orders/my"));
		let (_, mut receiver) = expect_wait(admit(&state, "/cart"));

		assert_eq!(lease.path(), "/orders/my");

		drop(lease);

		assert!(!state.lock().is_refreshing());
		assert_eq!(receiver.try_recv().expect("Waiter should not be cancelled."), Some(()));
	}

	#[test]
	fn dropped_waiters_do_not_block_release() {
		let state = SharedRefreshQueue::default();
		let lease = expect_lead(admit(&state, "/cart"));
		let (_, receiver) = expect_wait(admit(&state, "/cart"));

		drop(receiver);

		assert_eq!(lease.release(), vec![0]);
	}
}
