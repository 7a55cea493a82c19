// src/utils/process.rs

use anyhow::{Context, Result};
use tracing::error;
use widestring::U16CStr;
use windows::Win32::{
    Foundation::CloseHandle,
    System::{
        Diagnostics::ToolHelp::{
            CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
            TH32CS_SNAPPROCESS,
        },
        Threading::{OpenProcess, TerminateProcess, PROCESS_TERMINATE},
    },
};

#[derive(Debug, Clone)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

/// Snapshot of every running process: pid and image name.
pub fn list_processes() -> Result<Vec<ProcessEntry>> {
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
        .context("failed to snapshot running processes")?;
    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut processes = Vec::new();
    if unsafe { Process32FirstW(snapshot, &mut entry).is_ok() } {
        loop {
            let name = U16CStr::from_slice_truncate(&entry.szExeFile)
                .map(|wide| wide.to_string_lossy())
                .unwrap_or_default();
            processes.push(ProcessEntry {
                pid: entry.th32ProcessID,
                name,
            });
            if unsafe { Process32NextW(snapshot, &mut entry).is_err() } {
                break;
            }
        }
    }

    if let Err(e) = unsafe { CloseHandle(snapshot) } {
        error!("Failed to close snapshot handle: {:?}", e);
    }
    Ok(processes)
}

/// Forcibly terminates the process with the given pid.
pub fn terminate(pid: u32) -> Result<()> {
    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, false, pid)
            .with_context(|| format!("failed to open process {}", pid))?;
        let terminated = TerminateProcess(handle, 1)
            .with_context(|| format!("failed to terminate process {}", pid));
        if let Err(e) = CloseHandle(handle) {
            error!("Failed to close process handle: {:?}", e);
        }
        terminated
    }
}
