use anyhow::{anyhow, Result};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, instrument};
use xcb::{
    x::{Atom, GetProperty, InternAtom, Window, ATOM_ANY},
    Connection, Xid,
};

use crate::daemon::storage::entities::AppId;

use super::{normalize_app_name, ForegroundSampler};

fn intern_atom(conn: &Connection, name: &[u8]) -> Result<Atom> {
    let reply = conn.wait_for_reply(conn.send_request(&InternAtom {
        only_if_exists: false,
        name,
    }))?;
    Ok(reply.atom())
}

fn get_pid(conn: &Connection, window: Window, pid_atom: Atom) -> Result<u32> {
    let result = conn.wait_for_reply(conn.send_request(&GetProperty {
        delete: false,
        window,
        property: pid_atom,
        r#type: ATOM_ANY,
        long_offset: 0,
        long_length: 1,
    }))?;
    result
        .value::<u32>()
        .first()
        .copied()
        .ok_or_else(|| anyhow!("Window {window:?} doesn't expose _NET_WM_PID"))
}

fn get_active_window(conn: &Connection, root: Window, active_window_atom: Atom) -> Result<Window> {
    let result = conn.wait_for_reply(conn.send_request(&GetProperty {
        delete: false,
        window: root,
        property: active_window_atom,
        r#type: ATOM_ANY,
        long_offset: 0,
        long_length: 1,
    }))?;
    match result.value::<Window>().first() {
        Some(window) if !window.is_none() => Ok(*window),
        _ => Err(anyhow!("There is no active window")),
    }
}

pub struct X11Sampler {
    connection: Connection,
    preferred_screen: i32,
    active_window_atom: Atom,
    pid_atom: Atom,
    system: System,
}

impl X11Sampler {
    pub fn new() -> Result<Self> {
        let (connection, preferred_screen) = xcb::Connection::connect(None)?;
        let active_window_atom = intern_atom(&connection, b"_NET_ACTIVE_WINDOW")?;
        let pid_atom = intern_atom(&connection, b"_NET_WM_PID")?;
        Ok(Self {
            connection,
            preferred_screen,
            active_window_atom,
            pid_atom,
            system: System::new(),
        })
    }

    fn get_process_executable(&mut self, id: u32) -> Result<String> {
        let pid = Pid::from_u32(id);
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let process = self
            .system
            .process(pid)
            .ok_or_else(|| anyhow!("Process {id} exited before it could be inspected"))?;

        match process.exe().and_then(|v| v.to_str()) {
            Some(exe) => Ok(exe.to_string()),
            None => Ok(process.name().to_string_lossy().to_string()),
        }
    }

    #[instrument(level = "trace", skip(self))]
    fn get_foreground_executable(&mut self) -> Result<String> {
        let setup = self.connection.get_setup();

        // Currently the application only supports 1 x11 screen.
        let root = setup
            .roots()
            .nth(self.preferred_screen.max(0) as usize)
            .ok_or_else(|| anyhow!("Screen {} is not available", self.preferred_screen))?
            .root();

        let active_window = get_active_window(&self.connection, root, self.active_window_atom)?;
        let pid = get_pid(&self.connection, active_window, self.pid_atom)?;
        self.get_process_executable(pid)
    }
}

impl ForegroundSampler for X11Sampler {
    fn current_foreground_app(&mut self) -> Option<AppId> {
        self.get_foreground_executable()
            .inspect_err(|e| debug!("Skipping tick, foreground lookup failed {e:?}"))
            .ok()
            .and_then(|path| normalize_app_name(&path))
    }
}
