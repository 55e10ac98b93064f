//! Best-effort process introspection. Each lookup may come back empty.

use island_protocol::ProcessInfo;

pub fn current() -> ProcessInfo {
    ProcessInfo {
        pid: parent_pid(),
        tty: stdin_tty(),
    }
}

/// PID of the assistant process that spawned this hook.
fn parent_pid() -> Option<u32> {
    #[cfg(unix)]
    {
        // SAFETY: getppid() has no failure modes; it returns 1 if the parent exited.
        #[allow(unsafe_code)]
        Some(unsafe { libc::getppid() } as u32)
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// Terminal attached to stdin. Usually `None` for hooks, whose stdin is the
/// piped event payload.
fn stdin_tty() -> Option<String> {
    #[cfg(unix)]
    {
        let mut buf = [0 as libc::c_char; 256];
        // SAFETY: buf is valid for buf.len() bytes; ttyname_r writes at most that many.
        #[allow(unsafe_code)]
        let rc = unsafe { libc::ttyname_r(libc::STDIN_FILENO, buf.as_mut_ptr(), buf.len()) };
        if rc != 0 {
            return None;
        }
        // SAFETY: on success ttyname_r leaves a NUL-terminated path in buf.
        #[allow(unsafe_code)]
        let name = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr()) };
        Some(name.to_string_lossy().into_owned()).filter(|name| !name.is_empty())
    }
    #[cfg(not(unix))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_pid_is_known_on_unix() {
        if cfg!(unix) {
            let pid = parent_pid().unwrap();
            assert!(pid > 0);
        }
    }

    #[test]
    fn tty_when_present_is_a_device_path() {
        if let Some(tty) = current().tty {
            assert!(tty.starts_with("/dev/"), "{}", tty);
        }
    }
}
