//! Command interpreter
//!
//! Turns one line into at most one storage operation and one reply. The
//! interpreter is stateless between lines apart from the storage engine it
//! owns.
//!
//! # Validation order
//!
//! class name missing → class doesn't exist → instance id missing →
//! no instance found → attribute name missing → value missing →
//! invalid dictionary syntax → invalid value. The first applicable
//! message is the only one printed.

use std::io::{self, Write};

use super::errors::{CommandError, CommandResult};
use super::parse::{
    parse_fallback, parse_mapping_literal, split_call_args, split_command, tokenize, DottedCall,
    Fallback, Token,
};
use crate::model::{is_protected, FieldType, FieldValue, Kind, Record};
use crate::observability::{log_event_with_fields, Event};
use crate::storage::StorageEngine;

/// Whether the read loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// What a successful command prints
#[derive(Debug, Clone, PartialEq, Eq)]
enum Reply {
    Silent,
    Line(String),
}

/// The field assignments requested by an `update`
#[derive(Debug, Clone, PartialEq, Eq)]
enum UpdateArgs {
    /// `{ "field": value, ... }`
    Mapping(String),
    /// `<field> <value>`, either may be absent
    Pair {
        name: Option<Token>,
        value: Option<Token>,
    },
}

/// Commands listed by `help`, with their one-line descriptions
const HELP_TOPICS: &[(&str, &str)] = &[
    ("EOF", "Exit the console at end of input."),
    ("all", "Print every instance, or every instance of a class: all [<class>]"),
    ("count", "Print the number of instances of a class: count <class>"),
    ("create", "Create an instance, save it, and print its id: create <class>"),
    ("destroy", "Delete an instance and save: destroy <class> <id>"),
    ("help", "List commands, or describe one: help [<command>]"),
    ("quit", "Quit command to exit the program."),
    ("show", "Print an instance: show <class> <id>"),
    (
        "update",
        "Set attributes and save: update <class> <id> <attribute> <value> | update <class> <id> {<attribute>: <value>, ...}",
    ),
];

/// Line-command interpreter over a storage engine
pub struct Console<W: Write> {
    storage: StorageEngine,
    out: W,
}

impl<W: Write> Console<W> {
    /// Create an interpreter writing replies to `out`
    pub fn new(storage: StorageEngine, out: W) -> Self {
        Self { storage, out }
    }

    /// The storage engine this console mutates
    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    /// The reply sink
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consumes the console, returning its parts
    pub fn into_parts(self) -> (StorageEngine, W) {
        (self.storage, self.out)
    }

    /// Writes the prompt without a newline
    pub fn prompt(&mut self, prompt: &str) -> io::Result<()> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()
    }

    /// Handles end of input: prints a newline and exits
    pub fn end_of_input(&mut self) -> io::Result<Flow> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(Flow::Exit)
    }

    /// Executes one line.
    ///
    /// Command failures are printed, never returned. The only error is a
    /// failure to write to the reply sink.
    pub fn execute(&mut self, line: &str) -> io::Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let (verb, rest) = split_command(line);
        let outcome = match verb {
            "quit" => return Ok(Flow::Exit),
            "EOF" => return self.end_of_input(),
            "create" => self.do_create(rest),
            "show" => self.do_show(rest),
            "destroy" => self.do_destroy(rest),
            "all" => self.do_all(rest),
            "count" => self.do_count(rest),
            "update" => self.do_update(rest),
            "help" => self.do_help(rest),
            _ => self.default(line),
        };

        match outcome {
            Ok(Reply::Silent) => {}
            Ok(Reply::Line(text)) => writeln!(self.out, "{}", text)?,
            Err(err) => {
                if let CommandError::Persistence(ref storage_err) = err {
                    let detail = storage_err.to_string();
                    log_event_with_fields(
                        Event::StoragePersistFailed,
                        &[("error", detail.as_str()), ("line", line)],
                    );
                } else {
                    let message = err.to_string();
                    log_event_with_fields(
                        Event::CommandRejected,
                        &[("line", line), ("message", message.as_str())],
                    );
                }
                writeln!(self.out, "{}", err)?;
            }
        }
        self.out.flush()?;

        Ok(Flow::Continue)
    }

    fn do_create(&mut self, args: &str) -> CommandResult<Reply> {
        let tokens = tokenize(args)?;
        let kind = resolve_kind(first_text(&tokens))?;

        let record = Record::new(kind);
        let id = record.id().to_string();
        let key = record.key();
        self.storage.register(record);
        self.storage.persist()?;

        log_event_with_fields(Event::RecordCreated, &[("key", key.as_str())]);
        Ok(Reply::Line(id))
    }

    fn do_show(&mut self, args: &str) -> CommandResult<Reply> {
        let tokens = tokenize(args)?;
        self.show(first_text(&tokens), nth_text(&tokens, 1))
    }

    fn show(&self, kind: Option<&str>, id: Option<&str>) -> CommandResult<Reply> {
        let key = self.existing_key(kind, id)?;
        let record = self
            .storage
            .get(&key)
            .ok_or(CommandError::NoInstanceFound)?;
        Ok(Reply::Line(record.to_string()))
    }

    fn do_destroy(&mut self, args: &str) -> CommandResult<Reply> {
        let tokens = tokenize(args)?;
        self.destroy(first_text(&tokens), nth_text(&tokens, 1))
    }

    fn destroy(&mut self, kind: Option<&str>, id: Option<&str>) -> CommandResult<Reply> {
        let key = self.existing_key(kind, id)?;
        self.storage.remove(&key);
        self.storage.persist()?;

        log_event_with_fields(Event::RecordDestroyed, &[("key", key.as_str())]);
        Ok(Reply::Silent)
    }

    fn do_all(&mut self, args: &str) -> CommandResult<Reply> {
        let tokens = tokenize(args)?;
        self.all(first_text(&tokens))
    }

    fn all(&self, kind: Option<&str>) -> CommandResult<Reply> {
        let shown: Vec<String> = match kind {
            Some(name) => {
                let kind = resolve_kind(Some(name))?;
                self.storage
                    .records_of(kind)
                    .map(|record| record.to_string())
                    .collect()
            }
            None => self
                .storage
                .all()
                .values()
                .map(|record| record.to_string())
                .collect(),
        };
        Ok(Reply::Line(format!("[{}]", shown.join(", "))))
    }

    fn do_count(&mut self, args: &str) -> CommandResult<Reply> {
        let tokens = tokenize(args)?;
        self.count(first_text(&tokens))
    }

    fn count(&self, kind: Option<&str>) -> CommandResult<Reply> {
        let kind = resolve_kind(kind)?;
        Ok(Reply::Line(self.storage.count(kind).to_string()))
    }

    fn do_update(&mut self, args: &str) -> CommandResult<Reply> {
        let tokens = tokenize_prefix(args, 2)?;
        let kind = first_text(&tokens);
        let id = nth_text(&tokens, 1);

        // Resolve the target before looking at the assignments
        let key = self.existing_key(kind, id)?;

        let rest = match tokens.get(1) {
            Some(token) => args[token.end..].trim(),
            None => "",
        };
        let assignments = if rest.starts_with('{') {
            UpdateArgs::Mapping(rest.to_string())
        } else {
            let mut words = tokenize(rest)?.into_iter();
            UpdateArgs::Pair {
                name: words.next(),
                value: words.next(),
            }
        };

        self.update(&key, assignments)
    }

    fn update(&mut self, key: &str, args: UpdateArgs) -> CommandResult<Reply> {
        let record = self
            .storage
            .get_mut(key)
            .ok_or(CommandError::NoInstanceFound)?;

        let requested: Vec<(String, FieldValue)> = match args {
            UpdateArgs::Mapping(text) => parse_mapping_literal(&text)?,
            UpdateArgs::Pair { name, value } => {
                let name = name.ok_or(CommandError::AttributeNameMissing)?;
                let value = value.ok_or(CommandError::ValueMissing)?;
                let value = match record.kind().field_type(&name.text) {
                    Some(FieldType::Str) => FieldValue::Str(value.text),
                    _ => value.coerce(),
                };
                vec![(name.text, value)]
            }
        };

        // Validate everything before assigning anything
        let mut checked = Vec::with_capacity(requested.len());
        for (name, value) in requested {
            if is_protected(&name) {
                continue;
            }
            let value = record
                .check_field(&name, value)
                .map_err(|_| CommandError::InvalidValue(name.clone()))?;
            checked.push((name, value));
        }

        let fields: Vec<String> = checked.iter().map(|(name, _)| name.clone()).collect();
        for (name, value) in checked {
            record
                .set_field(&name, value)
                .map_err(|_| CommandError::InvalidValue(name.clone()))?;
        }
        record.touch();

        self.storage.persist()?;

        let fields = fields.join(",");
        log_event_with_fields(
            Event::RecordUpdated,
            &[("fields", fields.as_str()), ("key", key)],
        );
        Ok(Reply::Silent)
    }

    fn do_help(&mut self, args: &str) -> CommandResult<Reply> {
        let tokens = tokenize(args)?;
        match first_text(&tokens) {
            None => {
                let header = "Documented commands (type help <topic>):";
                let names: Vec<&str> = HELP_TOPICS.iter().map(|(name, _)| *name).collect();
                Ok(Reply::Line(format!(
                    "{}\n{}\n{}",
                    header,
                    "=".repeat(header.len()),
                    names.join("  ")
                )))
            }
            Some(topic) => HELP_TOPICS
                .iter()
                .find(|(name, _)| *name == topic)
                .map(|(_, text)| Reply::Line(text.to_string()))
                .ok_or_else(|| CommandError::NoHelp(topic.to_string())),
        }
    }

    /// Handles lines that aren't a known verb: the `Kind.method(args)` form.
    fn default(&mut self, line: &str) -> CommandResult<Reply> {
        match parse_fallback(line) {
            Fallback::Call(call) => self.dotted_call(call),
            Fallback::Malformed { kind } => {
                resolve_kind(Some(kind))?;
                Err(CommandError::InvalidSyntax)
            }
            Fallback::Unrecognized => Err(CommandError::UnknownSyntax(line.to_string())),
        }
    }

    fn dotted_call(&mut self, call: DottedCall<'_>) -> CommandResult<Reply> {
        resolve_kind(Some(call.kind))?;
        let args: Vec<Token> = split_call_args(call.args)?
            .into_iter()
            .map(Token::from_raw)
            .collect();
        let id = args.first().map(|t| t.text.as_str()).filter(|s| !s.is_empty());

        match call.method {
            "all" if args.is_empty() => self.all(Some(call.kind)),
            "count" if args.is_empty() => self.count(Some(call.kind)),
            "show" if args.len() <= 1 => self.show(Some(call.kind), id),
            "destroy" if args.len() <= 1 => self.destroy(Some(call.kind), id),
            "update" => {
                let key = self.existing_key(Some(call.kind), id)?;
                let update_args = match args.get(1) {
                    Some(second) if !second.quoted && second.text.starts_with('{') => {
                        if args.len() > 2 {
                            return Err(CommandError::InvalidSyntax);
                        }
                        UpdateArgs::Mapping(second.text.clone())
                    }
                    _ => {
                        if args.len() > 3 {
                            return Err(CommandError::InvalidSyntax);
                        }
                        UpdateArgs::Pair {
                            name: args.get(1).cloned().filter(|t| !t.text.is_empty()),
                            value: args.get(2).cloned(),
                        }
                    }
                };
                self.update(&key, update_args)
            }
            _ => Err(CommandError::InvalidSyntax),
        }
    }

    /// Validates kind and id and returns the key of an existing record.
    fn existing_key(&self, kind: Option<&str>, id: Option<&str>) -> CommandResult<String> {
        let kind = resolve_kind(kind)?;
        let id = id.ok_or(CommandError::InstanceIdMissing)?;
        let key = kind.key_for(id);
        if self.storage.get(&key).is_none() {
            return Err(CommandError::NoInstanceFound);
        }
        Ok(key)
    }
}

fn resolve_kind(name: Option<&str>) -> CommandResult<Kind> {
    let name = name.ok_or(CommandError::ClassNameMissing)?;
    Kind::from_name(name).ok_or(CommandError::ClassDoesntExist)
}

fn first_text(tokens: &[Token]) -> Option<&str> {
    nth_text(tokens, 0)
}

fn nth_text(tokens: &[Token], n: usize) -> Option<&str> {
    tokens.get(n).map(|t| t.text.as_str())
}

/// Tokenizes only the first `n` words, leaving the rest of the input raw.
fn tokenize_prefix(input: &str, n: usize) -> CommandResult<Vec<Token>> {
    let mut tokens = Vec::with_capacity(n);
    let mut offset = 0;
    while tokens.len() < n {
        let rest = &input[offset..];
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        let start = offset + (rest.len() - trimmed.len());
        let word_end = next_word_end(&input[start..]);
        let mut word = tokenize(&input[start..start + word_end])?;
        match word.pop() {
            Some(mut token) => {
                token.end = start + word_end;
                offset = token.end;
                tokens.push(token);
            }
            None => break,
        }
    }
    Ok(tokens)
}

/// Byte length of the first word of `input`, honoring quotes.
fn next_word_end(input: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (pos, c) in input.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c.is_whitespace() => return pos,
            None => {}
        }
    }
    input.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        console: Console<Vec<u8>>,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let storage = StorageEngine::new(dir.path().join("file.json"));
            Self {
                _dir: dir,
                console: Console::new(storage, Vec::new()),
            }
        }

        /// Runs one line and returns what it printed
        fn run(&mut self, line: &str) -> String {
            let start = self.console.output().len();
            self.console.execute(line).unwrap();
            String::from_utf8(self.console.output()[start..].to_vec()).unwrap()
        }

        fn create(&mut self, kind: &str) -> String {
            self.run(&format!("create {}", kind)).trim().to_string()
        }

        fn record(&self, kind: Kind, id: &str) -> &Record {
            self.console.storage().get(&kind.key_for(id)).unwrap()
        }
    }

    #[test]
    fn test_blank_line_is_noop() {
        let mut h = Harness::new();
        assert_eq!(h.run(""), "");
        assert_eq!(h.run("   \t"), "");
    }

    #[test]
    fn test_quit_and_eof() {
        let mut h = Harness::new();
        assert_eq!(h.console.execute("quit").unwrap(), Flow::Exit);
        assert!(h.console.output().is_empty());
        assert_eq!(h.console.execute("EOF").unwrap(), Flow::Exit);
        assert_eq!(h.console.output(), b"\n");
    }

    #[test]
    fn test_create_prints_id_and_persists() {
        let mut h = Harness::new();
        let id = h.create("Amenity");
        assert_eq!(id.len(), 36);
        let content = std::fs::read_to_string(h.console.storage().path()).unwrap();
        assert!(content.contains(&format!("Amenity.{}", id)));
    }

    #[test]
    fn test_create_errors() {
        let mut h = Harness::new();
        assert_eq!(h.run("create"), "** class name missing **\n");
        assert_eq!(h.run("create MyModel"), "** class doesn't exist **\n");
    }

    #[test]
    fn test_show_validation_order() {
        let mut h = Harness::new();
        assert_eq!(h.run("show"), "** class name missing **\n");
        assert_eq!(h.run("show MyModel"), "** class doesn't exist **\n");
        assert_eq!(h.run("show MyModel 123"), "** class doesn't exist **\n");
        assert_eq!(h.run("show BaseModel"), "** instance id missing **\n");
        assert_eq!(h.run("show State 123"), "** no instance found **\n");
    }

    #[test]
    fn test_show_prints_string_form() {
        let mut h = Harness::new();
        let id = h.create("User");
        let shown = h.run(&format!("show User {}", id));
        assert!(shown.starts_with(&format!("[User] ({})", id)));
        assert!(shown.contains("\"email\":\"\""));
    }

    #[test]
    fn test_show_is_kind_scoped() {
        let mut h = Harness::new();
        let id = h.create("City");
        assert_eq!(h.run(&format!("show State {}", id)), "** no instance found **\n");
    }

    #[test]
    fn test_destroy_then_show() {
        let mut h = Harness::new();
        let id = h.create("Review");
        assert_eq!(h.run(&format!("destroy Review {}", id)), "");
        assert_eq!(h.run(&format!("show Review {}", id)), "** no instance found **\n");
        assert_eq!(h.run(&format!("destroy Review {}", id)), "** no instance found **\n");
    }

    #[test]
    fn test_all_filters_by_kind() {
        let mut h = Harness::new();
        let city = h.create("City");
        let state = h.create("State");
        let all = h.run("all");
        assert!(all.contains(&city) && all.contains(&state));
        let cities = h.run("all City");
        assert!(cities.contains(&city) && !cities.contains(&state));
        assert_eq!(h.run("all Place"), "[]\n");
        assert_eq!(h.run("all Nope"), "** class doesn't exist **\n");
    }

    #[test]
    fn test_count() {
        let mut h = Harness::new();
        h.create("City");
        h.create("City");
        assert_eq!(h.run("count City"), "2\n");
        assert_eq!(h.run("count"), "** class name missing **\n");
    }

    #[test]
    fn test_update_positional_validation() {
        let mut h = Harness::new();
        let id = h.create("BaseModel");
        assert_eq!(h.run("update"), "** class name missing **\n");
        assert_eq!(h.run("update Nope"), "** class doesn't exist **\n");
        assert_eq!(h.run("update BaseModel"), "** instance id missing **\n");
        assert_eq!(h.run("update BaseModel missing name x"), "** no instance found **\n");
        assert_eq!(
            h.run(&format!("update BaseModel {}", id)),
            "** attribute name missing **\n"
        );
        assert_eq!(
            h.run(&format!("update BaseModel {} name", id)),
            "** value missing **\n"
        );
    }

    #[test]
    fn test_update_positional_coercion() {
        let mut h = Harness::new();
        let id = h.create("BaseModel");
        h.run(&format!("update BaseModel {} name 'Updated'", id));
        h.run(&format!("update BaseModel {} rooms 4", id));
        h.run(&format!("update BaseModel {} ratio 0.75", id));
        h.run(&format!("update BaseModel {} label \"12\"", id));
        h.run(&format!("update BaseModel {} motto \"Big Sky\"", id));
        let record = h.record(Kind::BaseModel, &id);
        assert_eq!(record.get("name"), Some(&FieldValue::from("Updated")));
        assert_eq!(record.get("rooms"), Some(&FieldValue::Int(4)));
        assert_eq!(record.get("ratio"), Some(&FieldValue::Float(0.75)));
        assert_eq!(record.get("label"), Some(&FieldValue::from("12")));
        assert_eq!(record.get("motto"), Some(&FieldValue::from("Big Sky")));
    }

    #[test]
    fn test_update_declared_string_keeps_text() {
        let mut h = Harness::new();
        let id = h.create("Place");
        h.run(&format!("update Place {} name 1.50", id));
        assert_eq!(
            h.record(Kind::Place, &id).get("name"),
            Some(&FieldValue::from("1.50"))
        );
    }

    #[test]
    fn test_update_declared_type_rejected() {
        let mut h = Harness::new();
        let id = h.create("Place");
        assert_eq!(
            h.run(&format!("update Place {} number_rooms lots", id)),
            "** invalid value for number_rooms **\n"
        );
        assert_eq!(
            h.record(Kind::Place, &id).get("number_rooms"),
            Some(&FieldValue::Int(0))
        );
    }

    #[test]
    fn test_update_mapping_literal() {
        let mut h = Harness::new();
        let id = h.create("BaseModel");
        let out = h.run(&format!(
            "update BaseModel {} {{\"name\": \"Pool\", \"number\": 3}}",
            id
        ));
        assert_eq!(out, "");
        let record = h.record(Kind::BaseModel, &id);
        assert_eq!(record.get("name"), Some(&FieldValue::from("Pool")));
        assert_eq!(record.get("number"), Some(&FieldValue::Int(3)));
    }

    #[test]
    fn test_update_mapping_literal_is_all_or_nothing() {
        let mut h = Harness::new();
        let id = h.create("Place");
        assert_eq!(
            h.run(&format!(
                "update Place {} {{\"name\": \"Loft\", \"max_guest\": \"many\"}}",
                id
            )),
            "** invalid value for max_guest **\n"
        );
        assert_eq!(
            h.record(Kind::Place, &id).get("name"),
            Some(&FieldValue::from(""))
        );
        assert_eq!(
            h.run(&format!("update Place {} {{\"name\": ", id)),
            "** invalid dictionary syntax **\n"
        );
    }

    #[test]
    fn test_update_protected_fields_ignored() {
        let mut h = Harness::new();
        let id = h.create("State");
        let created = h.record(Kind::State, &id).created_at();
        h.run(&format!("update State {} id hijacked", id));
        h.run(&format!(
            "update State {} {{\"id\": \"x\", \"created_at\": \"y\", \"name\": \"Utah\"}}",
            id
        ));
        let record = h.record(Kind::State, &id);
        assert_eq!(record.id(), id);
        assert_eq!(record.created_at(), created);
        assert_eq!(record.get("name"), Some(&FieldValue::from("Utah")));
        assert!(h.console.storage().get("State.hijacked").is_none());
    }

    #[test]
    fn test_update_bumps_updated_at() {
        let mut h = Harness::new();
        let id = h.create("City");
        let before = h.record(Kind::City, &id).updated_at();
        std::thread::sleep(std::time::Duration::from_millis(2));
        h.run(&format!("update City {} name Austin", id));
        let record = h.record(Kind::City, &id);
        assert!(record.updated_at() > before);
        assert!(record.created_at() <= record.updated_at());
    }

    #[test]
    fn test_dotted_all_and_count() {
        let mut h = Harness::new();
        for _ in 0..3 {
            h.create("City");
        }
        h.create("State");
        assert_eq!(h.run("City.count()"), "3\n");
        assert_eq!(h.run("State.count()"), "1\n");
        let cities = h.run("City.all()");
        assert_eq!(cities.matches("[City]").count(), 3);
        assert_eq!(h.run("Castle.count()"), "** class doesn't exist **\n");
    }

    #[test]
    fn test_dotted_show_and_destroy() {
        let mut h = Harness::new();
        let id = h.create("User");
        assert!(h.run(&format!("User.show(\"{}\")", id)).contains(&id));
        assert_eq!(h.run("User.show()"), "** instance id missing **\n");
        assert_eq!(h.run(&format!("User.destroy({})", id)), "");
        assert_eq!(h.run(&format!("User.show({})", id)), "** no instance found **\n");
    }

    #[test]
    fn test_dotted_update_forms() {
        let mut h = Harness::new();
        let id = h.create("Place");
        h.run(&format!("Place.update(\"{}\", \"max_guest\", 6)", id));
        h.run(&format!(
            "Place.update(\"{}\", {{'latitude': 37.77, 'amenity_ids': ['wifi']}})",
            id
        ));
        h.run(&format!("Place.update(\"{}\", \"description\", \"Sunny, quiet\")", id));
        let place = h.record(Kind::Place, &id);
        assert_eq!(place.get("max_guest"), Some(&FieldValue::Int(6)));
        assert_eq!(place.get("latitude"), Some(&FieldValue::Float(37.77)));
        assert_eq!(
            place.get("amenity_ids"),
            Some(&FieldValue::List(vec!["wifi".into()]))
        );
        assert_eq!(
            place.get("description"),
            Some(&FieldValue::from("Sunny, quiet"))
        );
        assert_eq!(
            h.run(&format!("Place.update(\"{}\", \"name\")", id)),
            "** value missing **\n"
        );
        assert_eq!(
            h.run(&format!("Place.update(\"{}\")", id)),
            "** attribute name missing **\n"
        );
    }

    #[test]
    fn test_dotted_malformed() {
        let mut h = Harness::new();
        assert_eq!(h.run("City.fly()"), "** invalid syntax **\n");
        assert_eq!(h.run("City.count"), "** invalid syntax **\n");
        assert_eq!(h.run("City.all(1)"), "** invalid syntax **\n");
        assert_eq!(h.run("Castle.count"), "** class doesn't exist **\n");
        assert_eq!(h.run("City.show(\"abc)"), "** invalid syntax **\n");
    }

    #[test]
    fn test_unknown_verb() {
        let mut h = Harness::new();
        assert_eq!(h.run("frobnicate now"), "*** Unknown syntax: frobnicate now\n");
    }

    #[test]
    fn test_help() {
        let mut h = Harness::new();
        let listing = h.run("help");
        assert!(listing.starts_with("Documented commands (type help <topic>):\n"));
        assert!(listing.contains("create"));
        assert_eq!(h.run("help quit"), "Quit command to exit the program.\n");
        assert_eq!(h.run("help dance"), "*** No help on dance\n");
    }

    #[test]
    fn test_persistence_failure_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let storage = StorageEngine::new(blocker.join("file.json"));
        let mut console = Console::new(storage, Vec::new());

        console.execute("create City").unwrap();
        let out = String::from_utf8(console.output().clone()).unwrap();
        assert!(out.starts_with("** persistence failed: "));
        assert!(out.contains("HBNB_STORAGE_WRITE_FAILED"));
        // The table is still authoritative
        assert_eq!(console.storage().count(Kind::City), 1);
    }

    #[test]
    fn test_tokenize_prefix_leaves_rest_raw() {
        let input = "BaseModel \"a b\"  {\"k\": 1}";
        let tokens = tokenize_prefix(input, 2).unwrap();
        assert_eq!(tokens[0].text, "BaseModel");
        assert_eq!(tokens[1].text, "a b");
        assert_eq!(input[tokens[1].end..].trim(), "{\"k\": 1}");
    }
}
