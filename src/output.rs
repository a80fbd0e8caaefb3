use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ClearResult, RunResult, StatusResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_status(result: &StatusResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_clear(result: &ClearResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct HumanOutput;

impl HumanOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "records: {}", result.records)?;
        for report in &result.reports {
            writeln!(
                stdout,
                "{:<12} {:>6} rows  {}",
                report.kind.to_string(),
                report.rows,
                report.path
            )?;
        }
        if !result.skipped.is_empty() {
            writeln!(stdout, "skipped: {}", result.skipped.len())?;
            for entity in &result.skipped {
                writeln!(stdout, "  {} ({}): {}", entity.name, entity.url, entity.error)?;
            }
        }
        Ok(())
    }

    pub fn print_status(result: &StatusResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "cache:  {}", result.cache_dir)?;
        writeln!(stdout, "output: {}", result.output_dir)?;
        for entry in &result.entries {
            let state = if entry.present { "present" } else { "missing" };
            write!(stdout, "{:<8} {state:<8} {}", entry.key.to_string(), entry.path)?;
            if let Some(metadata) = &entry.metadata {
                write!(stdout, "  fetched {}", metadata.fetched_at)?;
                if let Some(entries) = metadata.entries {
                    write!(stdout, ", {entries} entries")?;
                }
            }
            writeln!(stdout)?;
        }
        Ok(())
    }

    pub fn print_clear(result: &ClearResult) -> io::Result<()> {
        if result.cleared {
            println!("cache cleared");
        } else {
            println!("cache already empty");
        }
        Ok(())
    }
}
