use std::cell::RefCell;

/// Behaviour to show messages to the user.
pub trait UserInterface {
    /// Show a regular message (ex: help).
    fn print(&self, message: String);

    /// Show an error message.
    fn print_error(&self, message: String);
}

/// Prints messages to stdout, and errors to stderr.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, message: String) {
        eprintln!("{message}");
    }
}

/// Captures messages in memory, for inspection by tests.
#[derive(Debug, Default)]
pub struct InMemoryInterface {
    messages: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
}

impl UserInterface for InMemoryInterface {
    fn print(&self, message: String) {
        self.messages.borrow_mut().push(message);
    }

    fn print_error(&self, message: String) {
        self.errors.borrow_mut().push(message);
    }
}

impl InMemoryInterface {
    /// Take the captured messages and errors, each joined by newlines.
    pub fn consume(self) -> (Option<String>, Option<String>) {
        let InMemoryInterface { messages, errors } = self;
        let join = |lines: Vec<String>| (!lines.is_empty()).then(|| lines.join("\n"));
        (join(messages.into_inner()), join(errors.into_inner()))
    }
}
