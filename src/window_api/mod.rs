//! Contains logic for finding out which application is in the foreground.
//! [GenericSampler] is the main artifact of this module that abstracts the operations over
//! different environments.

#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use anyhow::Result;

use crate::daemon::storage::entities::AppId;

/// Intended to serve as a contract windows and linux systems must implement.
///
/// Lookup failures (no focused window, access denied, the process exiting halfway through the
/// lookup) are not errors for the caller. They simply mean that the current second can't be
/// attributed to anyone, so `None` is returned.
#[cfg_attr(test, mockall::automock)]
pub trait ForegroundSampler: Send {
    fn current_foreground_app(&mut self) -> Option<AppId>;
}

/// Serves as a cross-compatible [ForegroundSampler] implementation.
pub struct GenericSampler {
    inner: Box<dyn ForegroundSampler>,
}

impl GenericSampler {
    pub fn new() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                use win::WindowsSampler;
                Ok(Self {
                    inner: Box::new(WindowsSampler::new()),
                })
            }
            else if #[cfg(feature = "x11")] {
                use x11::X11Sampler;
                Ok(Self {
                    inner: Box::new(X11Sampler::new()?),
                })
            }
            else {
                Err(anyhow::anyhow!(
                    "No foreground sampler was compiled in. Build with the `win` or `x11` feature"
                ))
            }
        }
    }
}

impl ForegroundSampler for GenericSampler {
    fn current_foreground_app(&mut self) -> Option<AppId> {
        self.inner.current_foreground_app()
    }
}

/// Turns a path to an executable into the identifier usage is recorded under, which is the
/// executable's file name. Both `/` and `\` are treated as separators, so Windows paths
/// normalize the same way on every platform.
pub fn normalize_app_name(executable: &str) -> Option<AppId> {
    let name = executable
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() {
        None
    } else {
        Some(name.into())
    }
}
