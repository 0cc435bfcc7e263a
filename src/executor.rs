use futures::{
    future::{BoxFuture, FutureExt},
    task::{waker_ref, ArcWake, Context, Poll},
};
use futures_channel::oneshot;
use queues::{IsQueue, Queue};
use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
};

use crate::tb_obj::TbObj;
use crate::value::Val;

/// Tasks woken by a trigger, waiting to be polled.
#[derive(Clone)]
pub(crate) struct ReadyQueue(TbObj<Queue<Arc<Task>>>);

impl ReadyQueue {
    fn new() -> Self {
        ReadyQueue(TbObj::new(Queue::new()))
    }
    fn push(&self, task: Arc<Task>) {
        // unbounded queue, adding can't fail
        self.0.with_mut(|q| {
            let _ = q.add(task);
        });
    }
    fn pop(&self) -> Option<Arc<Task>> {
        self.0.with_mut(|q| q.remove().ok())
    }
}

/// Single threaded executor. Tasks only make progress inside `run_once`, which the
/// kernel calls between the phases of a time step.
pub struct Executor {
    ready: ReadyQueue,
}

impl Executor {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Executor {
            ready: ReadyQueue::new(),
        }
    }

    pub fn spawn(&self, future: impl Future<Output = Val> + Send + 'static) -> JoinHandle {
        let (task, join_handle) = Task::new(future.boxed(), self.ready.clone());
        self.ready.push(task);
        join_handle
    }

    /// Polls ready tasks until none are left.
    #[inline]
    pub fn run_once(&self) {
        while let Some(task) = self.ready.pop() {
            process_task(task);
        }
    }
}

#[inline]
fn process_task(task: Arc<Task>) {
    let mut fut_slot = lock(&task.future);
    // a completed task can still be woken by a stale waker
    let Some(mut fut) = fut_slot.take() else {
        return;
    };
    let waker = waker_ref(&task);
    let context = &mut Context::from_waker(&waker);
    match fut.as_mut().poll(context) {
        Poll::Pending => *fut_slot = Some(fut),
        Poll::Ready(result) => {
            if let Some(tx) = lock(&task.join_tx).take() {
                // receiver may be gone, nobody cares about the result then
                let _ = tx.send(result);
            }
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct Task {
    future: Mutex<Option<BoxFuture<'static, Val>>>,
    join_tx: Mutex<Option<oneshot::Sender<Val>>>,
    ready: ReadyQueue,
}

impl Task {
    fn new(fut: BoxFuture<'static, Val>, ready: ReadyQueue) -> (Arc<Self>, JoinHandle) {
        let (tx, rx) = oneshot::channel::<Val>();
        let task = Self {
            future: Mutex::new(Some(fut)),
            join_tx: Mutex::new(Some(tx)),
            ready,
        };
        (Arc::new(task), JoinHandle { join_rx: rx })
    }
}

impl ArcWake for Task {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.ready.push(arc_self.clone());
    }
}

pub struct JoinHandle {
    join_rx: oneshot::Receiver<Val>,
}

impl JoinHandle {
    /// Output of the task if it completed. Yields the value only once.
    pub fn try_join(&mut self) -> Option<Val> {
        self.join_rx.try_recv().ok().flatten()
    }
}

impl Future for JoinHandle {
    type Output = Val;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.join_rx.poll_unpin(cx) {
            Poll::Ready(result) => Poll::Ready(result.unwrap_or_default()),
            Poll::Pending => Poll::Pending,
        }
    }
}
