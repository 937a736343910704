
use anyhow::{anyhow, Result};
use tracing::debug;
use windows::{
    core::PWSTR,
    Win32::{
        Foundation::{CloseHandle, BOOL, HANDLE},
        System::Threading::{
            OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
            PROCESS_QUERY_LIMITED_INFORMATION,
        },
        UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowThreadProcessId},
    },
};

use crate::daemon::storage::entities::AppId;

use super::{normalize_app_name, ForegroundSampler};

/// Full path to the executable owning the foreground window.
#[tracing::instrument(level = "trace")]
pub fn get_foreground_executable() -> Result<String> {
    let window = unsafe { GetForegroundWindow() };

    if window.is_invalid() {
        return Err(anyhow!("There is no foreground window"));
    }

    let mut id = 0u32;
    unsafe { GetWindowThreadProcessId(window, Some(&mut id)) };
    if id == 0 {
        return Err(anyhow!("Foreground window has no owning process"));
    }

    // Limited information is enough for the image name and works for elevated processes too.
    let process_handle =
        unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, BOOL::from(false), id) }?;

    let mut text: [u16; 4096] = [0; 4096];
    let process_path = unsafe { get_process_path(process_handle, &mut text) };

    unsafe { CloseHandle(process_handle) }?;

    process_path
}

unsafe fn get_process_path(process_handle: HANDLE, text: &mut [u16]) -> Result<String> {
    unsafe {
        let mut length = text.len() as u32;
        QueryFullProcessImageNameW(
            process_handle,
            PROCESS_NAME_WIN32,
            PWSTR(text.as_mut_ptr()),
            &mut length,
        )?;
        Ok(String::from_utf16_lossy(&text[..length as usize]))
    }
}

pub struct WindowsSampler {}

impl WindowsSampler {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for WindowsSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ForegroundSampler for WindowsSampler {
    fn current_foreground_app(&mut self) -> Option<AppId> {
        get_foreground_executable()
            .inspect_err(|e| debug!("Skipping tick, foreground lookup failed {e:?}"))
            .ok()
            .and_then(|path| normalize_app_name(&path))
    }
}
