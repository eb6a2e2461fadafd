use std::{fs, path::PathBuf};

use rustyline::{error::ReadlineError, DefaultEditor};

use crate::{
    diagnostics::{Result, SelectwayError},
    runtime::Interpreter,
    scripts::{self, ScriptBuffer},
};

const HELP: &str = "\
Available commands:
/list                  Show all commands and what they do
/new <file.sw>         Create a new .sw file
/edit [file.sw]        Edit a .sw file (shows a list if no filename)
/run [file.sw]         Run a .sw file (shows a list if no filename)
/exit                  Exit the interpreter
Statements:
  /print <expr>          Print a value or string
  /input <var>           Input a value for a variable
  /input \"Prompt\" var    Input with a custom prompt
  /random <var> <a> <b>  Random integer between a and b
  /x = 5                 Variable assignment
  /name = \"Alice\"        String assignment
  /if <cond> ... /else   Conditional block (body indented 4 spaces)
  /while <cond>          Loop (body indented 4 spaces)
  # ...                  Comment
Use case examples:
  /input name
  /input \"What is your age?\" age
  /print \"Hello, \" + name";

/// Interactive shell. One interpreter lives for the whole session, so
/// variables persist across lines and script runs.
pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        Self { interpreter }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().map_err(readline_error)?;
        println!("SELECTWAY Interactive Mode (type '/exit' to quit, '/list' for help)");
        loop {
            let Some(line) = ask(&mut editor, ">>> ")? else {
                break;
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            editor.add_history_entry(trimmed).ok();
            let (command, argument) = match trimmed.split_once(char::is_whitespace) {
                Some((command, argument)) => (command, argument.trim()),
                None => (trimmed, ""),
            };
            match command.to_lowercase().as_str() {
                "/exit" => break,
                "/list" => println!("{HELP}"),
                "/new" => self.new_script(&mut editor, argument)?,
                "/edit" => self.edit_script(&mut editor, argument)?,
                "/run" => self.run_script(&mut editor, argument)?,
                _ => self.execute(&line),
            }
        }
        Ok(())
    }

    fn execute(&mut self, source: &str) {
        match self.interpreter.run(source) {
            Ok(()) => {}
            Err(SelectwayError::Diagnostic(diag)) => eprintln!("{}", diag.summary()),
            Err(other) => eprintln!("error: {other}"),
        }
    }

    fn new_script(&mut self, editor: &mut DefaultEditor, argument: &str) -> Result<()> {
        let name = if argument.is_empty() {
            match ask(editor, "Enter new file name (with .sw extension): ")? {
                Some(name) => name.trim().to_string(),
                None => return Ok(()),
            }
        } else {
            argument.to_string()
        };
        match scripts::create_script(name.as_ref()) {
            Ok(()) => println!("Created new file: {name}"),
            Err(SelectwayError::Diagnostic(diag)) => println!("{}", diag.message),
            Err(err) => println!("Could not create file: {err}"),
        }
        Ok(())
    }

    fn run_script(&mut self, editor: &mut DefaultEditor, argument: &str) -> Result<()> {
        let Some(path) = resolve_script(editor, argument, "run")? else {
            return Ok(());
        };
        match fs::read_to_string(&path) {
            Ok(source) => {
                println!("Running {}:", path.display());
                self.execute(&source);
            }
            Err(err) => println!("Could not run {}: {err}", path.display()),
        }
        Ok(())
    }

    fn edit_script(&mut self, editor: &mut DefaultEditor, argument: &str) -> Result<()> {
        let Some(path) = resolve_script(editor, argument, "edit")? else {
            return Ok(());
        };
        let mut buffer = match ScriptBuffer::open(&path) {
            Ok(buffer) => buffer,
            Err(err) => {
                println!("Could not open {}: {err}", path.display());
                return Ok(());
            }
        };
        println!("Editing {}.", path.display());
        loop {
            println!("\n--- File Editor ---");
            for line in buffer.render() {
                println!("{line}");
            }
            println!("Options: [A]dd line, [E]dit line, [D]elete line, [S]ave, [Q]uit editor");
            let Some(choice) = ask(editor, "Select option: ")? else {
                break;
            };
            let outcome = match choice.trim().to_lowercase().as_str() {
                "a" => match ask(editor, "Enter new line: ")? {
                    Some(line) => {
                        buffer.add(line);
                        Ok(())
                    }
                    None => Ok(()),
                },
                "e" => match ask_line_number(editor, "Line number to edit: ")? {
                    Some(number) => match ask(editor, "New text: ")? {
                        Some(text) => buffer.replace(number, text),
                        None => Ok(()),
                    },
                    None => Ok(()),
                },
                "d" => match ask_line_number(editor, "Line number to delete: ")? {
                    Some(number) => buffer.delete(number).map(|_| ()),
                    None => Ok(()),
                },
                "s" => buffer
                    .save()
                    .map(|()| println!("Saved {}.", buffer.path().display())),
                "q" => break,
                _ => {
                    println!("Unknown option.");
                    Ok(())
                }
            };
            match outcome {
                Ok(()) => {}
                Err(SelectwayError::Diagnostic(diag)) => println!("{}", diag.message),
                Err(err) => println!("Could not save: {err}"),
            }
        }
        println!("Stopped editing {}.", buffer.path().display());
        Ok(())
    }
}

/// Uses `argument` as the script path, or lets the user pick one of the
/// `.sw` files in the current directory.
fn resolve_script(
    editor: &mut DefaultEditor,
    argument: &str,
    verb: &str,
) -> Result<Option<PathBuf>> {
    if !argument.is_empty() {
        return Ok(Some(PathBuf::from(argument)));
    }
    let candidates = scripts::list_scripts(".".as_ref())?;
    if candidates.is_empty() {
        println!("No .sw files found in current directory.");
        return Ok(None);
    }
    println!("Select a file to {verb}:");
    for (idx, path) in candidates.iter().enumerate() {
        println!("{}: {}", idx + 1, path.display());
    }
    let choice = ask_line_number(editor, "Enter file number: ")?;
    match choice.and_then(|number| candidates.get(number - 1)) {
        Some(path) => Ok(Some(path.clone())),
        None => {
            println!("Invalid selection.");
            Ok(None)
        }
    }
}

fn ask(editor: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match editor.readline(prompt) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(readline_error(err)),
    }
}

/// Positive number typed by the user; anything else prints a notice.
fn ask_line_number(editor: &mut DefaultEditor, prompt: &str) -> Result<Option<usize>> {
    let Some(text) = ask(editor, prompt)? else {
        return Ok(None);
    };
    match text.trim().parse::<usize>() {
        Ok(number) if number > 0 => Ok(Some(number)),
        _ => {
            println!("Invalid input.");
            Ok(None)
        }
    }
}

fn readline_error(err: ReadlineError) -> SelectwayError {
    SelectwayError::from(std::io::Error::new(std::io::ErrorKind::Other, err))
}
