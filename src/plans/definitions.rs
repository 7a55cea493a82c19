// src/plans/definitions.rs

use std::{env, path::PathBuf};

use super::Plan;
use crate::{
    actions::{Action, ActionPolicy},
    utils::registry::RegistryValue,
};

/// AppX name patterns swept by the bloatware plan.
const BLOATWARE_PATTERNS: &[&str] = &[
    "*Microsoft.3DBuilder*",                    // 3D Builder
    "*Microsoft.549981C3F5F10*",                // Cortana
    "*Microsoft.BingNews*",                     // News
    "*Microsoft.BingWeather*",                  // Weather
    "*Microsoft.GetHelp*",                      // Get Help
    "*Microsoft.Getstarted*",                   // Tips
    "*Microsoft.MicrosoftOfficeHub*",           // Office promotion
    "*Microsoft.MicrosoftSolitaireCollection*", // Solitaire
    "*Microsoft.MixedReality.Portal*",          // Mixed Reality Portal
    "*Microsoft.People*",                       // People
    "*Microsoft.PowerAutomateDesktop*",         // Power Automate
    "*Microsoft.SkypeApp*",                     // Skype
    "*Microsoft.Todos*",                        // To Do
    "*Microsoft.WindowsAlarms*",                // Alarms & Clock
    "*Microsoft.WindowsFeedbackHub*",           // Feedback Hub
    "*Microsoft.WindowsMaps*",                  // Maps
    "*Microsoft.WindowsSoundRecorder*",         // Sound Recorder
    "*Microsoft.YourPhone*",                    // Phone Link
    "*Microsoft.ZuneMusic*",                    // Groove / Media Player
    "*Microsoft.ZuneVideo*",                    // Movies & TV
    "*Clipchamp.Clipchamp*",                    // Clipchamp
    "*king.com.CandyCrush*",                    // Candy Crush
    "*BytedancePte.Ltd.TikTok*",                // TikTok
];

/// Disk-cleanup handlers armed before running cleanmgr.
const VOLUME_CACHES: &[&str] = &[
    "Temporary Files",
    "Temporary Setup Files",
    "Recycle Bin",
    "Thumbnail Cache",
    "Delivery Optimization Files",
    "Update Cleanup",
    "Windows Error Reporting Files",
];

fn program_files_x86() -> PathBuf {
    env::var_os("ProgramFiles(x86)")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Program Files (x86)"))
}

fn local_app_data() -> PathBuf {
    env::var_os("LOCALAPPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Users\Default\AppData\Local"))
}

fn system_root() -> PathBuf {
    env::var_os("SystemRoot")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Windows"))
}

pub fn remove_edge() -> Plan {
    let edge_dir = program_files_x86().join(r"Microsoft\Edge");
    let uninstall_line = format!(
        r#""{}" --uninstall --system-level --verbose-logging --force-uninstall"#,
        edge_dir.join(r"Application\msedge_installer.exe").display()
    );
    Plan::new(
        "remove-edge",
        "Uninstall Microsoft Edge and delete its leftovers",
        vec![
            Action::stop_process(ActionPolicy::BestEffort, "msedge"),
            Action::stop_process(ActionPolicy::BestEffort, "MicrosoftEdgeUpdate"),
            // The vendor uninstaller has undocumented silent flags and an
            // unverifiable outcome; everything after it cleans up whatever
            // it leaves behind.
            Action::run_command_line(ActionPolicy::BestEffort, &uninstall_line),
            Action::remove_package(ActionPolicy::BestEffort, "*MicrosoftEdge*"),
            Action::delete_registry_key(
                ActionPolicy::BestEffort,
                r"HKLM\SOFTWARE\Policies\Microsoft\Edge",
            ),
            Action::delete_path(ActionPolicy::BestEffort, edge_dir),
        ],
    )
}

pub fn remove_copilot() -> Plan {
    Plan::new(
        "remove-copilot",
        "Disable and remove Windows Copilot",
        vec![
            Action::stop_process(ActionPolicy::BestEffort, "Copilot"),
            Action::remove_package(ActionPolicy::BestEffort, "*Copilot*"),
            Action::set_registry_value(
                ActionPolicy::Required,
                r"HKCU\Software\Policies\Microsoft\Windows\WindowsCopilot",
                "TurnOffWindowsCopilot",
                RegistryValue::Dword(1),
            ),
            Action::set_registry_value(
                ActionPolicy::BestEffort,
                r"HKLM\SOFTWARE\Policies\Microsoft\Windows\WindowsCopilot",
                "TurnOffWindowsCopilot",
                RegistryValue::Dword(1),
            ),
            Action::set_registry_value(
                ActionPolicy::BestEffort,
                r"HKCU\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced",
                "ShowCopilotButton",
                RegistryValue::Dword(0),
            ),
        ],
    )
}

pub fn disable_widgets() -> Plan {
    Plan::new(
        "disable-widgets",
        "Disable the Widgets board and news feed",
        vec![
            Action::set_registry_value(
                ActionPolicy::Required,
                r"HKLM\SOFTWARE\Policies\Microsoft\Dsh",
                "AllowNewsAndInterests",
                RegistryValue::Dword(0),
            ),
            Action::set_registry_value(
                ActionPolicy::BestEffort,
                r"HKCU\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced",
                "TaskbarDa",
                RegistryValue::Dword(0),
            ),
            Action::stop_process(ActionPolicy::BestEffort, "Widgets*"),
            Action::remove_package(ActionPolicy::BestEffort, "*WebExperience*"),
        ],
    )
}

pub fn disable_game_bar() -> Plan {
    Plan::new(
        "disable-game-bar",
        "Disable Game Bar and game capture",
        vec![
            Action::set_registry_value(
                ActionPolicy::Required,
                r"HKCU\System\GameConfigStore",
                "GameDVR_Enabled",
                RegistryValue::Dword(0),
            ),
            Action::set_registry_value(
                ActionPolicy::Required,
                r"HKCU\Software\Microsoft\Windows\CurrentVersion\GameDVR",
                "AppCaptureEnabled",
                RegistryValue::Dword(0),
            ),
            Action::set_registry_value(
                ActionPolicy::BestEffort,
                r"HKLM\SOFTWARE\Policies\Microsoft\Windows\GameDVR",
                "AllowGameDVR",
                RegistryValue::Dword(0),
            ),
            Action::stop_process(ActionPolicy::BestEffort, "GameBar*"),
            Action::remove_package(ActionPolicy::BestEffort, "*XboxGamingOverlay*"),
        ],
    )
}

pub fn reset_taskbar_layout() -> Plan {
    Plan::new(
        "reset-taskbar-layout",
        "Reset the taskbar and Start layout to defaults",
        vec![
            // Explorer must be gone before its cached state is deleted, so
            // this one aborts the plan if it fails.
            Action::stop_process(ActionPolicy::Required, "explorer"),
            Action::delete_registry_key(
                ActionPolicy::BestEffort,
                r"HKCU\Software\Microsoft\Windows\CurrentVersion\Explorer\Taskband",
            ),
            Action::delete_registry_key(
                ActionPolicy::BestEffort,
                r"HKCU\Software\Microsoft\Windows\CurrentVersion\CloudStore\Store\Cache\DefaultAccount",
            ),
            Action::delete_path(
                ActionPolicy::BestEffort,
                local_app_data().join(r"Microsoft\Windows\Explorer"),
            ),
            // Relaunch and move on; the shell outlives the plan.
            Action::run_command_detached(ActionPolicy::Required, "explorer.exe", &[]),
        ],
    )
}

pub fn remove_bloatware() -> Plan {
    let actions = BLOATWARE_PATTERNS
        .iter()
        .map(|pattern| Action::remove_package(ActionPolicy::BestEffort, pattern))
        .collect();
    Plan::new(
        "remove-bloatware",
        "Remove preinstalled consumer apps for all users",
        actions,
    )
}

pub fn disk_cleanup() -> Plan {
    let mut actions: Vec<Action> = VOLUME_CACHES
        .iter()
        .map(|cache| {
            Action::set_registry_value(
                ActionPolicy::BestEffort,
                &format!(
                    r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Explorer\VolumeCaches\{}",
                    cache
                ),
                "StateFlags0064",
                RegistryValue::Dword(2),
            )
        })
        .collect();
    actions.push(Action::run_command(
        ActionPolicy::Required,
        "cleanmgr.exe",
        &["/sagerun:64"],
    ));
    Plan::new(
        "disk-cleanup",
        "Arm and run the system disk cleanup profile",
        actions,
    )
}

pub fn remove_timer_service() -> Plan {
    Plan::new(
        "remove-timer-service",
        "Remove the Set Timer Resolution service",
        vec![
            Action::stop_process(ActionPolicy::BestEffort, "SetTimerResolutionService"),
            Action::run_command(
                ActionPolicy::BestEffort,
                "sc.exe",
                &["stop", "Set Timer Resolution Service"],
            ),
            Action::run_command(
                ActionPolicy::BestEffort,
                "sc.exe",
                &["delete", "Set Timer Resolution Service"],
            ),
            Action::delete_path(
                ActionPolicy::BestEffort,
                system_root().join("SetTimerResolutionService.exe"),
            ),
        ],
    )
}
