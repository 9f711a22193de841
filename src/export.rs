/// Client start-command artifacts.
///
/// After a bulk run (or an offline `commands` run) the operator gets three
/// files listing how to start each provisioned demo client:
/// - `client_commands.txt`: commented plain list
/// - `start_all_clients.bat`: Windows launcher, one console per client
/// - `start_all_clients.sh`: bash launcher, clients backgrounded
///
/// Files are overwritten on every run.
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::provision::{derive_credential, generate_endpoints, DeviceTemplate, OscoreCredential};

pub const COMMAND_LOG_FILE: &str = "client_commands.txt";
pub const BATCH_FILE: &str = "start_all_clients.bat";
pub const SHELL_FILE: &str = "start_all_clients.sh";

/// Template for the demo client start command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    pub jar: String,
    /// Server host passed with `-u`.
    pub server_host: String,
}

impl Default for ClientCommand {
    fn default() -> Self {
        Self {
            jar: "leshan-client-demo.jar".to_string(),
            server_host: "127.0.0.1".to_string(),
        }
    }
}

impl ClientCommand {
    /// Render the start command for one device.
    ///
    /// The client's sender id is the server's recipient id and vice versa,
    /// hence `-sid` takes the recipient id.
    pub fn render(&self, endpoint: &str, credential: &OscoreCredential) -> String {
        format!(
            "java -jar {} -b -n {} -msec {} -sid {} -rid {} -u {}",
            self.jar,
            endpoint,
            credential.master_secret,
            credential.recipient_id,
            credential.sender_id,
            self.server_host
        )
    }
}

/// One line of the exported artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartCommand {
    pub endpoint: String,
    pub command: String,
    pub oscore: OscoreCredential,
}

/// Paths written by `write_artifacts`.
#[derive(Debug, Clone)]
pub struct ExportedFiles {
    pub command_log: PathBuf,
    pub batch: PathBuf,
    pub shell: PathBuf,
}

/// Derive start commands for a template without contacting any server.
///
/// Sequence numbers follow the bulk pipeline (1-based position in the
/// run), so the output matches what a `generate` run would have recorded.
pub fn plan_start_commands(template: &DeviceTemplate, client: &ClientCommand) -> Vec<StartCommand> {
    generate_endpoints(template)
        .into_iter()
        .zip(1u32..)
        .map(|(endpoint, seq)| {
            let oscore = derive_credential(seq);
            StartCommand {
                command: client.render(&endpoint, &oscore),
                endpoint,
                oscore,
            }
        })
        .collect()
}

pub fn render_command_log(commands: &[StartCommand], generated_at: NaiveDateTime) -> String {
    let mut content = String::from("# Leshan Client Start Commands\n");
    content.push_str(&format!(
        "# Generated: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    for c in commands {
        content.push_str(&format!("# {}\n{}\n\n", c.endpoint, c.command));
    }

    content
}

pub fn render_batch(commands: &[StartCommand]) -> String {
    let mut content = String::from("@echo off\necho Starting all Leshan clients...\n\n");

    for c in commands {
        content.push_str(&format!("echo Starting {}...\n", c.endpoint));
        content.push_str(&format!("start cmd /k \"{}\"\n", c.command));
    }

    content.push_str("\necho All clients started!\npause\n");
    content
}

pub fn render_shell(commands: &[StartCommand]) -> String {
    let mut content =
        String::from("#!/usr/bin/env bash\nset -e\n\necho \"Starting all Leshan clients...\"\n\n");

    for c in commands {
        content.push_str(&format!("echo \"Starting {}...\"\n", c.endpoint));
        content.push_str(&format!("{} &\n", c.command));
    }

    content.push_str("\necho \"All clients started!\"\n");
    content
}

/// Write all three artifacts into `dir`, creating it if needed.
pub fn write_artifacts(dir: &Path, commands: &[StartCommand]) -> Result<ExportedFiles> {
    fs::create_dir_all(dir)?;

    let files = ExportedFiles {
        command_log: dir.join(COMMAND_LOG_FILE),
        batch: dir.join(BATCH_FILE),
        shell: dir.join(SHELL_FILE),
    };

    fs::write(
        &files.command_log,
        render_command_log(commands, Utc::now().naive_utc()),
    )?;
    fs::write(&files.batch, render_batch(commands))?;
    fs::write(&files.shell, render_shell(commands))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&files.shell, fs::Permissions::from_mode(0o755))?;
    }

    info!(
        dir = %dir.display(),
        commands = commands.len(),
        "Client start commands exported"
    );

    Ok(files)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample() -> Vec<StartCommand> {
        let template = DeviceTemplate::new("Sensor", 1, 2, 2).unwrap();
        plan_start_commands(&template, &ClientCommand::default())
    }

    #[test]
    fn test_render_swaps_sender_and_recipient() {
        let cmd = ClientCommand::default().render("Sensor01", &derive_credential(1));
        assert_eq!(
            cmd,
            "java -jar leshan-client-demo.jar -b -n Sensor01 -msec 0001 -sid 03 -rid 02 -u 127.0.0.1"
        );
    }

    #[test]
    fn test_plan_uses_run_position() {
        let template = DeviceTemplate::new("Node", 40, 2, 3).unwrap();
        let plan = plan_start_commands(&template, &ClientCommand::default());

        assert_eq!(plan[0].endpoint, "Node040");
        assert_eq!(plan[0].oscore.master_secret, "0001");
        assert_eq!(plan[1].endpoint, "Node041");
        assert_eq!(plan[1].oscore.master_secret, "0002");
    }

    #[test]
    fn test_command_log_layout() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        let log = render_command_log(&sample(), at);

        assert!(log.starts_with("# Leshan Client Start Commands\n# Generated: 2024-05-01 12:30:00\n\n"));
        assert!(log.contains("# Sensor02\njava -jar leshan-client-demo.jar -b -n Sensor02 -msec 0002"));
    }

    #[test]
    fn test_batch_and_shell_layout() {
        let commands = sample();

        let bat = render_batch(&commands);
        assert!(bat.starts_with("@echo off\n"));
        assert!(bat.contains("start cmd /k \"java -jar leshan-client-demo.jar -b -n Sensor01"));
        assert!(bat.ends_with("pause\n"));

        let sh = render_shell(&commands);
        assert!(sh.starts_with("#!/usr/bin/env bash\nset -e\n"));
        assert!(sh.contains("-u 127.0.0.1 &\n"));
    }

    #[test]
    fn test_write_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");

        let files = write_artifacts(&out, &sample()).unwrap();
        let log = fs::read_to_string(&files.command_log).unwrap();
        assert!(log.contains("# Sensor01"));
        assert!(files.batch.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&files.shell).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        // A second run overwrites rather than appends.
        write_artifacts(&out, &sample()[..1]).unwrap();
        let log = fs::read_to_string(&files.command_log).unwrap();
        assert!(!log.contains("# Sensor02"));
    }
}
