// src/utils/powershell.rs

use std::ffi::CString;

use anyhow::{bail, Context, Result};
use windows::{
    core::PSTR,
    Win32::{
        Foundation::{
            CloseHandle, SetHandleInformation, HANDLE, HANDLE_FLAGS, HANDLE_FLAG_INHERIT, TRUE,
            WAIT_OBJECT_0,
        },
        Security::SECURITY_ATTRIBUTES,
        Storage::FileSystem::ReadFile,
        System::{
            Pipes::CreatePipe,
            Threading::{
                CreateProcessA, GetExitCodeProcess, WaitForSingleObject, CREATE_NO_WINDOW,
                INFINITE, PROCESS_INFORMATION, STARTF_USESHOWWINDOW, STARTF_USESTDHANDLES,
                STARTUPINFOA,
            },
        },
        UI::WindowsAndMessaging::SW_HIDE,
    },
};

/// Runs a PowerShell script in a hidden window and returns its trimmed
/// stdout.
///
/// A non-zero exit code or any error-stream output is a failure: the
/// package probes built on this must not mistake a broken enumeration for
/// an empty one.
pub fn run_script(script: &str) -> Result<String> {
    let sa = SECURITY_ATTRIBUTES {
        nLength: std::mem::size_of::<SECURITY_ATTRIBUTES>() as u32,
        bInheritHandle: TRUE,
        lpSecurityDescriptor: std::ptr::null_mut(),
    };

    let (stdout_read, stdout_write) =
        inheritable_pipe(&sa).context("failed to create stdout pipe")?;
    let (stderr_read, stderr_write) =
        inheritable_pipe(&sa).context("failed to create stderr pipe")?;

    let startup_info = STARTUPINFOA {
        cb: std::mem::size_of::<STARTUPINFOA>() as u32,
        dwFlags: STARTF_USESHOWWINDOW | STARTF_USESTDHANDLES,
        wShowWindow: SW_HIDE.0 as u16,
        hStdOutput: stdout_write,
        hStdError: stderr_write,
        ..Default::default()
    };

    let command_line = format!(
        "powershell -NoProfile -NonInteractive -ExecutionPolicy Bypass -WindowStyle Hidden -Command \"{}\"",
        script.replace('"', r#"\""#)
    );
    let command_line =
        CString::new(command_line).context("script contains an interior NUL byte")?;

    let mut process_info = PROCESS_INFORMATION::default();
    unsafe {
        CreateProcessA(
            None,
            PSTR(command_line.as_ptr() as *mut u8),
            None,
            None,
            TRUE,
            CREATE_NO_WINDOW,
            None,
            None,
            &startup_info,
            &mut process_info,
        )
        .context("failed to start powershell")?;

        // The child owns the write ends now; keeping them open here would
        // stall the reads below forever.
        let _ = CloseHandle(stdout_write);
        let _ = CloseHandle(stderr_write);
    }

    // Drain both pipes before waiting so a chatty script cannot fill a
    // pipe buffer and deadlock against us.
    let stdout = read_pipe(stdout_read);
    let stderr = read_pipe(stderr_read);

    let exit_code = unsafe {
        let wait = WaitForSingleObject(process_info.hProcess, INFINITE);
        let mut code: u32 = 0;
        let queried = GetExitCodeProcess(process_info.hProcess, &mut code);

        let _ = CloseHandle(process_info.hProcess);
        let _ = CloseHandle(process_info.hThread);
        let _ = CloseHandle(stdout_read);
        let _ = CloseHandle(stderr_read);

        if wait != WAIT_OBJECT_0 {
            bail!("failed waiting for powershell to exit: {:?}", wait);
        }
        queried.context("failed to query powershell exit code")?;
        code
    };

    if exit_code != 0 {
        bail!(
            "powershell exited with code {}: {}",
            exit_code,
            stderr.trim()
        );
    }
    if !stderr.trim().is_empty() {
        bail!("powershell error output: {}", stderr.trim());
    }

    Ok(stdout.trim().to_string())
}

/// Creates a pipe whose write end the child inherits; the read end stays
/// private to this process.
fn inheritable_pipe(sa: &SECURITY_ATTRIBUTES) -> Result<(HANDLE, HANDLE)> {
    let mut read = HANDLE::default();
    let mut write = HANDLE::default();
    unsafe {
        CreatePipe(&mut read, &mut write, Some(sa), 0).context("CreatePipe failed")?;
        SetHandleInformation(read, HANDLE_FLAG_INHERIT.0, HANDLE_FLAGS(0))
            .context("SetHandleInformation failed")?;
    }
    Ok((read, write))
}

fn read_pipe(handle: HANDLE) -> String {
    let mut buffer = [0u8; 4096];
    let mut output = Vec::new();
    loop {
        let mut bytes_read: u32 = 0;
        let success =
            unsafe { ReadFile(handle, Some(&mut buffer), Some(&mut bytes_read), None).is_ok() };
        if !success || bytes_read == 0 {
            break;
        }
        output.extend_from_slice(&buffer[..bytes_read as usize]);
    }
    String::from_utf8_lossy(&output).to_string()
}
