// src/utils/windows.rs

use windows::Win32::{
    Foundation::{CloseHandle, HANDLE},
    Security::{GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY},
    System::Threading::{GetCurrentProcess, OpenProcessToken},
};

/// Whether the current process holds administrator rights.
///
/// Plans mutate machine-wide state (HKLM, Program Files, other users'
/// packages); the caller checks this before executing anything.
pub fn is_elevated() -> bool {
    let mut token = HANDLE::default();
    if unsafe { OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token) }.is_err() {
        return false;
    }

    let mut elevation: TOKEN_ELEVATION = unsafe { std::mem::zeroed() };
    let mut returned = std::mem::size_of::<TOKEN_ELEVATION>() as u32;
    let elevated = unsafe {
        GetTokenInformation(
            token,
            TokenElevation,
            Some(&mut elevation as *mut _ as *mut _),
            std::mem::size_of::<TOKEN_ELEVATION>() as u32,
            &mut returned,
        )
    }
    .map(|_| elevation.TokenIsElevated != 0)
    .unwrap_or(false);

    if let Err(e) = unsafe { CloseHandle(token) } {
        tracing::debug!("Failed to close token handle: {:?}", e);
    }
    elevated
}
