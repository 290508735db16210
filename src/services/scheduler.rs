// ============================================================================
// SCHEDULER - Fuente de ticks (requestAnimationFrame) + spawner de tareas
// ============================================================================
// El bucle de captura y los fades esperan frames a través de FrameScheduler,
// así los tests avanzan el tiempo a mano (ManualScheduler) sin reloj real.
// ============================================================================

use std::rc::Rc;
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture, LocalFutureObj};
use futures::task::{LocalSpawn, SpawnError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

// Fallback si requestAnimationFrame no está disponible (~60fps)
const FALLBACK_FRAME_MS: u32 = 16;

/// Fuente de frames de animación
pub trait FrameScheduler {
    /// Resuelve con el timestamp (ms) del próximo frame
    fn next_frame(&self) -> LocalBoxFuture<'static, f64>;

    /// Timestamp actual (ms), en la misma base que `next_frame`
    fn now(&self) -> f64;
}

pub type SharedScheduler = Rc<dyn FrameScheduler>;
pub type SharedSpawner = Rc<dyn LocalSpawn>;

/// Timestamp actual en ms (performance.now)
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Scheduler del navegador basado en requestAnimationFrame
#[derive(Debug, Default, Clone, Copy)]
pub struct AnimationFrameScheduler;

impl FrameScheduler for AnimationFrameScheduler {
    fn next_frame(&self) -> LocalBoxFuture<'static, f64> {
        let (tx, rx) = oneshot::channel::<f64>();
        let callback = Closure::once_into_js(move |now: f64| {
            let _ = tx.send(now);
        });

        let requested = web_sys::window()
            .map(|w| w.request_animation_frame(callback.unchecked_ref()).is_ok())
            .unwrap_or(false);

        if requested {
            async move { rx.await.unwrap_or_else(|_| now_ms()) }.boxed_local()
        } else {
            log::warn!("⚠️ [SCHEDULER] requestAnimationFrame no disponible, usando timeout");
            async move {
                gloo_timers::future::TimeoutFuture::new(FALLBACK_FRAME_MS).await;
                now_ms()
            }
            .boxed_local()
        }
    }

    fn now(&self) -> f64 {
        now_ms()
    }
}

/// Spawner sobre wasm_bindgen_futures::spawn_local
#[derive(Debug, Default, Clone, Copy)]
pub struct WasmSpawner;

impl LocalSpawn for WasmSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

#[cfg(test)]
pub use manual::ManualScheduler;

#[cfg(test)]
mod manual {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Scheduler de tests: los frames solo avanzan con `tick()`
    #[derive(Clone, Default)]
    pub struct ManualScheduler {
        pending: Rc<RefCell<Vec<oneshot::Sender<f64>>>>,
        current: Rc<Cell<f64>>,
    }

    impl ManualScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        /// Resuelve todos los frames pendientes con `now`
        pub fn tick(&self, now: f64) -> usize {
            self.current.set(now);
            let senders: Vec<_> = self.pending.borrow_mut().drain(..).collect();
            let count = senders.len();
            for sender in senders {
                let _ = sender.send(now);
            }
            count
        }

        pub fn pending(&self) -> usize {
            self.pending.borrow().len()
        }
    }

    impl FrameScheduler for ManualScheduler {
        fn next_frame(&self) -> LocalBoxFuture<'static, f64> {
            let (tx, rx) = oneshot::channel::<f64>();
            self.pending.borrow_mut().push(tx);
            // Sender descartado = scheduler destruido; el frame nunca llega
            async move {
                match rx.await {
                    Ok(now) => now,
                    Err(_) => futures::future::pending::<f64>().await,
                }
            }
            .boxed_local()
        }

        fn now(&self) -> f64 {
            self.current.get()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use std::cell::RefCell;

    #[test]
    fn test_manual_scheduler_ticks() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let scheduler = scheduler.clone();
            let seen = seen.clone();
            pool.spawner()
                .spawn_local(async move {
                    for _ in 0..2 {
                        let now = scheduler.next_frame().await;
                        seen.borrow_mut().push(now);
                    }
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.tick(16.0), 1);
        pool.run_until_stalled();
        scheduler.tick(32.0);
        pool.run_until_stalled();
        assert_eq!(*seen.borrow(), vec![16.0, 32.0]);
        assert_eq!(scheduler.now(), 32.0);
        assert_eq!(scheduler.pending(), 0);
    }
}
