use crate::config::DisplayLogEntry;
use anyhow::{Result, anyhow};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub enum Writer {
    Stdout(Box<dyn Write>),
    JsonStdout(Box<dyn Write>, bool),
    JsonFile(BufWriter<File>, bool), // bool tracks if we've written the opening bracket
    JsonlFile(BufWriter<File>),
    CsvFile(BufWriter<File>, bool), // bool tracks if we've written headers
    TsvFile(BufWriter<File>, bool),
}

impl Writer {
    pub fn write_batch(&mut self, entries: &[DisplayLogEntry]) -> Result<()> {
        match self {
            Writer::Stdout(writer) => {
                for entry in entries {
                    writeln!(writer, "{}", entry.render())?;
                }
            }
            Writer::JsonStdout(writer, is_first) => write_json_items(writer, is_first, entries)?,
            Writer::JsonFile(writer, is_first) => write_json_items(writer, is_first, entries)?,
            Writer::JsonlFile(writer) => {
                for entry in entries {
                    let serialized = serde_json::to_string(entry)?;
                    writeln!(writer, "{}", serialized)?;
                }
            }
            Writer::CsvFile(writer, headers_written) => {
                if !*headers_written {
                    writeln!(writer, "timestamp,text")?;
                    *headers_written = true;
                }
                for entry in entries {
                    writeln!(
                        writer,
                        "{},{}",
                        escape_csv_field(&entry.timestamp),
                        escape_csv_field(&entry.text)
                    )?;
                }
            }
            Writer::TsvFile(writer, headers_written) => {
                if !*headers_written {
                    writeln!(writer, "timestamp\ttext")?;
                    *headers_written = true;
                }
                for entry in entries {
                    writeln!(
                        writer,
                        "{}\t{}",
                        escape_tsv_field(&entry.timestamp),
                        escape_tsv_field(&entry.text)
                    )?;
                }
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        match self {
            Writer::JsonStdout(ref mut writer, is_first) => {
                close_json_array(writer, is_first)?;
            }
            Writer::JsonFile(ref mut writer, is_first) => {
                close_json_array(writer, is_first)?;
            }
            Writer::JsonlFile(ref mut writer)
            | Writer::CsvFile(ref mut writer, _)
            | Writer::TsvFile(ref mut writer, _) => {
                writer.flush()?;
            }
            Writer::Stdout(ref mut writer) => {
                writer.flush()?;
            }
        }
        Ok(())
    }
}

fn write_json_items<W: Write + ?Sized>(
    writer: &mut W,
    is_first: &mut bool,
    entries: &[DisplayLogEntry],
) -> Result<()> {
    for entry in entries {
        if *is_first {
            write!(writer, "[")?;
            *is_first = false;
        } else {
            write!(writer, ",")?;
        }
        let serialized = serde_json::to_string_pretty(entry)?;
        write!(writer, "\n{}", serialized)?;
    }
    Ok(())
}

fn close_json_array<W: Write + ?Sized>(writer: &mut W, is_first: bool) -> Result<()> {
    if is_first {
        // nothing written, still emit a valid document
        writeln!(writer, "[]")?;
    } else {
        writeln!(writer, "\n]")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn create_writer(output_arg: &str) -> Result<Writer> {
    match output_arg {
        "stdout" => Ok(Writer::Stdout(Box::new(io::stdout()))),
        "json" => Ok(Writer::JsonStdout(Box::new(io::stdout()), true)),
        path if path.ends_with(".json") => Ok(Writer::JsonFile(open_output(path)?, true)),
        path if path.ends_with(".jsonl") || path.ends_with(".ndjson") => {
            Ok(Writer::JsonlFile(open_output(path)?))
        }
        path if path.ends_with(".csv") => Ok(Writer::CsvFile(open_output(path)?, false)),
        path if path.ends_with(".tsv") => Ok(Writer::TsvFile(open_output(path)?, false)),
        path => {
            // Default to JSON file if it looks like a path
            if path.contains('/') || path.contains('\\') || path.contains('.') {
                Ok(Writer::JsonFile(open_output(path)?, true))
            } else {
                Err(anyhow!(
                    "Unknown output format: {}. Use 'stdout', 'json', or a file path",
                    output_arg
                ))
            }
        }
    }
}

fn open_output(path: &str) -> Result<BufWriter<File>> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn escape_tsv_field(field: &str) -> String {
    field.replace(['\t', '\n', '\r'], " ")
}
