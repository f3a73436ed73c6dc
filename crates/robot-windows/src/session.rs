// Windows session detection
//
// Input injection and GDI capture only work from a process attached to the
// interactive input desktop. Session 0 (services) has none.

use robot_platform::RobotError;
use tracing::{debug, warn};
use windows::Win32::Foundation::BOOL;
use windows::Win32::System::StationsAndDesktops::{
    CloseDesktop, OpenInputDesktop, DESKTOP_ACCESS_FLAGS, DF_ALLOWOTHERACCOUNTHOOK,
};
use windows::Win32::System::Threading::GetCurrentProcessId;

/// FFI binding for ProcessIdToSessionId (kernel32)
extern "system" {
    fn ProcessIdToSessionId(dwProcessId: u32, pSessionId: *mut u32) -> BOOL;
}

/// Returns the session ID of the current process.
///
/// Session 0 = SYSTEM service context (no desktop).
/// Session 1+ = interactive user session.
pub fn current_session_id() -> u32 {
    unsafe {
        let pid = GetCurrentProcessId();
        let mut session_id: u32 = 0;
        if !ProcessIdToSessionId(pid, &mut session_id).as_bool() {
            warn!("ProcessIdToSessionId failed, assuming session 0");
            return 0;
        }
        session_id
    }
}

/// Fails with `DisplayUnavailable` unless the process can reach the input desktop.
pub fn ensure_interactive() -> Result<(), RobotError> {
    let session_id = current_session_id();
    if session_id == 0 {
        return Err(RobotError::DisplayUnavailable(
            "running in Session 0 (service context), which has no desktop".into(),
        ));
    }

    // Opening the input desktop is the definitive test
    unsafe {
        match OpenInputDesktop(DF_ALLOWOTHERACCOUNTHOOK, false, DESKTOP_ACCESS_FLAGS(0)) {
            Ok(desktop) => {
                let _ = CloseDesktop(desktop);
                debug!("interactive desktop available in session {}", session_id);
                Ok(())
            }
            Err(e) => Err(RobotError::DisplayUnavailable(format!(
                "cannot open the input desktop in session {session_id}: {e}"
            ))),
        }
    }
}
