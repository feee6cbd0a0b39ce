// Drishti interactive console
// Drives a live guidance service: switch language, mute, inspect status

use anyhow::Result;
use drishti_core::Language;
use drishti_guide::GuidanceService;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct InteractiveConsole {
    service: GuidanceService,
    history: Vec<String>,
}

enum CommandResult {
    Continue,
    Exit,
    Output(String),
    Error(String),
}

impl InteractiveConsole {
    pub fn new(service: GuidanceService) -> Self {
        Self {
            service,
            history: Vec::new(),
        }
    }

    /// Run the console until `exit` or end of input, then stop the service
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("{}> ", self.prompt());
            io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if self.history.last() != Some(&line) {
                self.history.push(line.clone());
            }

            match self.handle_command(&line) {
                CommandResult::Continue => continue,
                CommandResult::Exit => break,
                CommandResult::Output(output) => println!("{}", output),
                CommandResult::Error(msg) => println!("Error: {}", msg),
            }
        }

        self.service.stop().await;
        println!("\nGoodbye!");
        Ok(())
    }

    fn print_banner(&self) {
        println!();
        println!("Drishti guidance console");
        println!("Type 'help' for available commands, 'exit' to quit");
        println!();
    }

    fn print_help(&self) {
        println!("Available Commands:");
        println!("  help, ?            - Show this help message");
        println!("  exit, quit, q      - Stop guidance and exit");
        println!("  tap                - Toggle narration language");
        println!("  lang <en|ta>       - Set narration language");
        println!("  mute / unmute      - Silence or resume narration");
        println!("  status             - Show service status");
        println!("  scene              - Show the latest cycle");
        println!("  history            - Show command history");
        println!();
    }

    fn prompt(&self) -> String {
        let settings = self.service.settings();
        if settings.muted {
            format!("drishti[{}, muted]", settings.language.code())
        } else {
            format!("drishti[{}]", settings.language.code())
        }
    }

    fn handle_command(&mut self, line: &str) -> CommandResult {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let command = parts[0].to_lowercase();

        match command.as_str() {
            "exit" | "quit" | "q" => CommandResult::Exit,
            "help" | "?" => {
                self.print_help();
                CommandResult::Continue
            }
            "tap" => {
                let language = self.service.toggle_language();
                CommandResult::Output(format!("Language: {}", language))
            }
            "lang" => {
                let Some(arg) = parts.get(1) else {
                    return CommandResult::Error("Usage: lang <en|ta>".to_string());
                };
                match arg.parse::<Language>() {
                    Ok(language) => {
                        self.service.set_language(language);
                        CommandResult::Output(format!("Language: {}", language))
                    }
                    Err(e) => CommandResult::Error(e),
                }
            }
            "mute" => {
                self.service.set_muted(true);
                CommandResult::Output("Narration muted".to_string())
            }
            "unmute" => {
                self.service.set_muted(false);
                CommandResult::Output("Narration resumed".to_string())
            }
            "status" => {
                let status = self.service.status();
                CommandResult::Output(format!(
                    "running: {}\nwelcomed: {}\nmode: {}\nlow light: {}\ncycles: {}\nannouncements: {}",
                    status.running, status.welcomed, status.mode, status.low_light, status.cycles, status.announcements
                ))
            }
            "scene" => match self.service.subscribe_reports().borrow().as_ref() {
                Some(report) => CommandResult::Output(crate::describe_report(report)),
                None => CommandResult::Output("No cycle yet".to_string()),
            },
            "history" => {
                for (i, cmd) in self.history.iter().enumerate() {
                    println!("  {}: {}", i + 1, cmd);
                }
                CommandResult::Continue
            }
            other => CommandResult::Error(format!("Unknown command: {} (try 'help')", other)),
        }
    }
}
