//! Command history: named commands with undo/redo.
//!
//! Commands are registered once and invoked by name. Each invocation returns a
//! [`CommandExecute`] pair whose `redo` is applied immediately and then kept on
//! a linear ledger. The ledger never shares state with the live model: each
//! closure owns its snapshot and clones it again on every application.

use crate::error::{EditorError, EditorResult};
use crate::event::DragEvents;
use crate::input::{KeyCombo, KeyInput};
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A model mutation stored on the ledger.
pub type Apply<M> = Box<dyn Fn(&mut M)>;

/// Unsubscribe hook returned by [`Command::init`].
pub type Teardown<M> = Box<dyn FnOnce(&mut DragEvents<M>)>;

/// Name of the built-in undo command.
pub const UNDO: &str = "undo";
/// Name of the built-in redo command.
pub const REDO: &str = "redo";

const UNDO_KEYS: &[&str] = &["ctrl+z"];
const REDO_KEYS: &[&str] = &["ctrl+y", "ctrl+shift+z"];

/// The undo/redo pair produced by one invocation.
pub struct CommandExecute<M> {
    pub undo: Option<Apply<M>>,
    pub redo: Apply<M>,
    /// False when the invocation left the model as it was. Such invocations
    /// are never recorded.
    pub changed: bool,
}

impl<M> CommandExecute<M> {
    /// A change that cannot be undone.
    pub fn redo_only(redo: impl Fn(&mut M) + 'static) -> Self {
        Self {
            undo: None,
            redo: Box::new(redo),
            changed: true,
        }
    }

    /// Nothing to apply and nothing to record.
    pub fn unchanged() -> Self {
        Self {
            undo: None,
            redo: Box::new(|_: &mut M| {}),
            changed: false,
        }
    }

    pub fn new(undo: impl Fn(&mut M) + 'static, redo: impl Fn(&mut M) + 'static) -> Self {
        Self {
            undo: Some(Box::new(undo)),
            redo: Box::new(redo),
            changed: true,
        }
    }
}

impl<M> std::fmt::Debug for CommandExecute<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecute")
            .field("undo", &self.undo.is_some())
            .field("changed", &self.changed)
            .finish()
    }
}

/// Queue of command names posted by event listeners.
///
/// Listeners cannot borrow the [`Commander`], so they post here and the owner
/// drains the queue with [`Commander::flush`] before returning to the host.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    queue: Rc<RefCell<VecDeque<String>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `name` to be invoked.
    pub fn request(&self, name: impl Into<String>) {
        self.queue.borrow_mut().push_back(name.into());
    }

    fn take(&self) -> Option<String> {
        self.queue.borrow_mut().pop_front()
    }

    /// Number of queued invocations.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

/// What a command receives during [`Commander::init`].
pub struct InitContext<'a, M> {
    pub events: &'a mut DragEvents<M>,
    pub dispatcher: Dispatcher,
}

/// A named, optionally undoable operation on `M`.
pub trait Command<M, A = ()> {
    /// Unique name used by [`Commander::invoke`].
    fn name(&self) -> &str;

    /// Key bindings such as `"ctrl+up"`.
    fn keyboard(&self) -> &[&str] {
        &[]
    }

    /// Whether invocations are recorded on the ledger.
    fn follow_queue(&self) -> bool {
        true
    }

    /// Subscribe to whatever the command needs.
    fn init(&mut self, _ctx: &mut InitContext<'_, M>) -> Option<Teardown<M>> {
        None
    }

    /// Release command-local state.
    fn destroy(&mut self) {}

    /// Compute the undo/redo pair. Must not mutate the model.
    fn execute(&mut self, model: &M, args: A) -> EditorResult<CommandExecute<M>>;
}

/// Result of offering a key press to the commander.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// No binding matched, or focus was elsewhere.
    Ignored,
    /// The named command ran. The host should prevent the default action and
    /// stop propagation.
    Handled(String),
}

impl KeyOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, KeyOutcome::Handled(_))
    }
}

struct Registered<M, A> {
    command: Box<dyn Command<M, A>>,
    keys: Vec<KeyCombo>,
    initialized: bool,
}

/// Command registry plus the undo/redo ledger.
pub struct Commander<M, A = ()> {
    commands: Vec<Registered<M, A>>,
    ledger: Vec<CommandExecute<M>>,
    /// Number of applied entries; the cursor is `applied - 1`.
    applied: usize,
    limit: Option<usize>,
    teardowns: Vec<Teardown<M>>,
    dispatcher: Dispatcher,
    undo_keys: Vec<KeyCombo>,
    redo_keys: Vec<KeyCombo>,
}

impl<M, A> Default for Commander<M, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, A> std::fmt::Debug for Commander<M, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commander")
            .field("commands", &self.command_names())
            .field("ledger", &self.ledger.len())
            .field("current", &self.current())
            .finish()
    }
}

impl<M, A> Commander<M, A> {
    /// Create an empty commander with the built-in undo/redo bindings.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            ledger: Vec::new(),
            applied: 0,
            limit: None,
            teardowns: Vec::new(),
            dispatcher: Dispatcher::new(),
            undo_keys: KeyCombo::parse_all(UNDO_KEYS).unwrap_or_default(),
            redo_keys: KeyCombo::parse_all(REDO_KEYS).unwrap_or_default(),
        }
    }

    /// Create a commander that keeps at most `limit` ledger entries.
    pub fn with_limit(limit: Option<usize>) -> Self {
        let mut commander = Self::new();
        commander.limit = limit;
        commander
    }

    /// Register a command. A command with the same name is replaced.
    pub fn register(&mut self, command: impl Command<M, A> + 'static) -> EditorResult<()> {
        let keys = KeyCombo::parse_all(command.keyboard())?;
        let name = command.name().to_string();
        let entry = Registered {
            command: Box::new(command),
            keys,
            initialized: false,
        };
        match self.position(&name) {
            Some(index) => {
                warn!("Replacing command {name:?}");
                self.commands[index] = entry;
            }
            None => self.commands.push(entry),
        }
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.commands.iter().position(|r| r.command.name() == name)
    }

    /// Names of registered commands in registration order.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|r| r.command.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Handle for listeners that need to invoke commands.
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Index of the last applied entry, `None` at the start of history.
    pub fn current(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    /// Number of ledger entries.
    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.ledger.len()
    }

    /// Forget every ledger entry.
    pub fn clear_history(&mut self) {
        self.ledger.clear();
        self.applied = 0;
    }

    /// Run `init` on every command not yet initialized, in registration order.
    pub fn init(&mut self, events: &mut DragEvents<M>) {
        for registered in self.commands.iter_mut().filter(|r| !r.initialized) {
            let mut ctx = InitContext {
                events: &mut *events,
                dispatcher: self.dispatcher.clone(),
            };
            if let Some(teardown) = registered.command.init(&mut ctx) {
                self.teardowns.push(teardown);
            }
            registered.initialized = true;
        }
    }

    /// Run every teardown once, then the `destroy` hook of every initialized
    /// command.
    pub fn destroy(&mut self, events: &mut DragEvents<M>) {
        for teardown in self.teardowns.drain(..) {
            teardown(events);
        }
        for registered in self.commands.iter_mut().filter(|r| r.initialized) {
            registered.command.destroy();
            registered.initialized = false;
        }
    }

    /// Invoke a command by name.
    pub fn invoke(&mut self, name: &str, model: &mut M, args: A) -> EditorResult<()> {
        match name {
            UNDO => {
                self.undo(model);
                return Ok(());
            }
            REDO => {
                self.redo(model);
                return Ok(());
            }
            _ => {}
        }
        let index = self
            .position(name)
            .ok_or_else(|| EditorError::UnknownCommand(name.to_string()))?;
        let command = &mut self.commands[index].command;
        let execute = command.execute(model, args)?;
        (execute.redo)(model);
        if command.follow_queue() && execute.changed {
            self.record(execute);
        }
        debug!("Invoked {name} (current = {:?})", self.current());
        Ok(())
    }

    fn record(&mut self, execute: CommandExecute<M>) {
        self.ledger.truncate(self.applied);
        self.ledger.push(execute);
        self.applied += 1;
        if let Some(limit) = self.limit {
            let excess = self.ledger.len().saturating_sub(limit);
            if excess > 0 {
                self.ledger.drain(..excess);
                self.applied -= excess;
            }
        }
    }

    /// Step back one entry. Returns false at the start of history.
    pub fn undo(&mut self, model: &mut M) -> bool {
        if self.applied == 0 {
            return false;
        }
        if let Some(undo) = &self.ledger[self.applied - 1].undo {
            undo(model);
        }
        self.applied -= 1;
        debug!("Undo (current = {:?})", self.current());
        true
    }

    /// Step forward one entry. Returns false at the end of history.
    pub fn redo(&mut self, model: &mut M) -> bool {
        let Some(entry) = self.ledger.get(self.applied) else {
            return false;
        };
        (entry.redo)(model);
        self.applied += 1;
        debug!("Redo (current = {:?})", self.current());
        true
    }
}

impl<M, A: Default> Commander<M, A> {
    /// Invoke the command bound to `key`, if any.
    ///
    /// Nothing happens while keyboard focus is on another element.
    pub fn handle_key(&mut self, key: &KeyInput, model: &mut M) -> EditorResult<KeyOutcome> {
        if key.focus_elsewhere {
            return Ok(KeyOutcome::Ignored);
        }
        let name = if self.undo_keys.iter().any(|k| k.matches(key)) {
            UNDO.to_string()
        } else if self.redo_keys.iter().any(|k| k.matches(key)) {
            REDO.to_string()
        } else {
            match self
                .commands
                .iter()
                .find(|r| r.keys.iter().any(|k| k.matches(key)))
            {
                Some(r) => r.command.name().to_string(),
                None => return Ok(KeyOutcome::Ignored),
            }
        };
        self.invoke(&name, model, A::default())?;
        Ok(KeyOutcome::Handled(name))
    }

    /// Invoke everything posted to the dispatcher. Returns the number run.
    pub fn flush(&mut self, model: &mut M) -> EditorResult<usize> {
        let mut count = 0;
        while let Some(name) = self.dispatcher.take() {
            self.invoke(&name, model, A::default())?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    /// Appends a value to the model.
    struct Push;

    impl Command<Vec<i32>, i32> for Push {
        fn name(&self) -> &str {
            "push"
        }

        fn keyboard(&self) -> &[&str] {
            &["ctrl+p"]
        }

        fn execute(&mut self, model: &Vec<i32>, value: i32) -> EditorResult<CommandExecute<Vec<i32>>> {
            let before = model.clone();
            let mut after = model.clone();
            after.push(value);
            Ok(CommandExecute::new(
                move |m| *m = before.clone(),
                move |m| *m = after.clone(),
            ))
        }
    }

    /// Doubles every value without recording.
    struct Double;

    impl Command<Vec<i32>, i32> for Double {
        fn name(&self) -> &str {
            "double"
        }

        fn follow_queue(&self) -> bool {
            false
        }

        fn execute(&mut self, _model: &Vec<i32>, _: i32) -> EditorResult<CommandExecute<Vec<i32>>> {
            Ok(CommandExecute::redo_only(|m: &mut Vec<i32>| {
                m.iter_mut().for_each(|v| *v *= 2)
            }))
        }
    }

    fn commander() -> Commander<Vec<i32>, i32> {
        let mut c = Commander::new();
        c.register(Push).unwrap();
        c.register(Double).unwrap();
        c
    }

    #[test]
    fn test_invoke_then_undo_all() {
        let mut c = commander();
        let mut model = vec![];
        for i in 1..=4 {
            c.invoke("push", &mut model, i).unwrap();
        }
        assert_eq!(model, vec![1, 2, 3, 4]);
        assert_eq!(c.current(), Some(3));

        for _ in 0..4 {
            assert!(c.undo(&mut model));
        }
        assert!(model.is_empty());
        assert_eq!(c.current(), None);
    }

    #[test]
    fn test_boundaries_are_noops() {
        let mut c = commander();
        let mut model = vec![];
        assert!(!c.undo(&mut model));
        assert!(!c.redo(&mut model));

        c.invoke("push", &mut model, 1).unwrap();
        assert!(!c.redo(&mut model));
        assert_eq!(model, vec![1]);
        assert_eq!(c.current(), Some(0));
    }

    #[test]
    fn test_invoke_after_undo_truncates() {
        let mut c = commander();
        let mut model = vec![];
        c.invoke("push", &mut model, 1).unwrap();
        c.invoke("push", &mut model, 2).unwrap();
        c.undo(&mut model);
        c.invoke("push", &mut model, 3).unwrap();

        assert_eq!(model, vec![1, 3]);
        assert_eq!(c.len(), 2);
        assert!(!c.can_redo());
        assert!(!c.redo(&mut model));
        assert_eq!(model, vec![1, 3]);
    }

    #[test]
    fn test_redo_reapplies() {
        let mut c = commander();
        let mut model = vec![];
        c.invoke("push", &mut model, 1).unwrap();
        c.invoke("push", &mut model, 2).unwrap();
        c.undo(&mut model);
        c.undo(&mut model);
        assert!(c.redo(&mut model));
        assert_eq!(model, vec![1]);
        assert!(c.redo(&mut model));
        assert_eq!(model, vec![1, 2]);
    }

    #[test]
    fn test_unrecorded_command() {
        let mut c = commander();
        let mut model = vec![];
        c.invoke("push", &mut model, 3).unwrap();
        c.invoke("double", &mut model, 0).unwrap();
        assert_eq!(model, vec![6]);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_unknown_command() {
        let mut c = commander();
        let mut model = vec![];
        let err = c.invoke("nope", &mut model, 0).unwrap_err();
        assert!(matches!(err, EditorError::UnknownCommand(name) if name == "nope"));
        assert!(c.is_empty());
    }

    #[test]
    fn test_undo_redo_by_name() {
        let mut c = commander();
        let mut model = vec![];
        c.invoke("push", &mut model, 1).unwrap();
        c.invoke(UNDO, &mut model, 0).unwrap();
        assert!(model.is_empty());
        c.invoke(REDO, &mut model, 0).unwrap();
        assert_eq!(model, vec![1]);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_history_limit() {
        let mut c: Commander<Vec<i32>, i32> = Commander::with_limit(Some(2));
        c.register(Push).unwrap();
        let mut model = vec![];
        for i in 1..=3 {
            c.invoke("push", &mut model, i).unwrap();
        }
        assert_eq!(c.len(), 2);
        assert_eq!(c.current(), Some(1));
        assert!(c.undo(&mut model));
        assert!(c.undo(&mut model));
        assert!(!c.undo(&mut model));
        assert_eq!(model, vec![1]);
    }

    #[test]
    fn test_handle_key() {
        let mut c = commander();
        let mut model = vec![];

        let outcome = c
            .handle_key(&KeyInput::new("p", Modifiers::ctrl()), &mut model)
            .unwrap();
        assert_eq!(outcome, KeyOutcome::Handled("push".to_string()));
        assert_eq!(model, vec![0]);

        let undo = c
            .handle_key(&KeyInput::new("z", Modifiers::ctrl()), &mut model)
            .unwrap();
        assert!(undo.is_handled());
        assert!(model.is_empty());

        let redo = KeyInput::new(
            "z",
            Modifiers {
                ctrl: true,
                shift: true,
                ..Modifiers::NONE
            },
        );
        assert_eq!(
            c.handle_key(&redo, &mut model).unwrap(),
            KeyOutcome::Handled(REDO.to_string())
        );
        assert_eq!(model, vec![0]);

        let plain = c
            .handle_key(&KeyInput::new("p", Modifiers::NONE), &mut model)
            .unwrap();
        assert_eq!(plain, KeyOutcome::Ignored);
    }

    #[test]
    fn test_key_ignored_when_focus_elsewhere() {
        let mut c = commander();
        let mut model = vec![];
        let mut key = KeyInput::new("p", Modifiers::ctrl());
        key.focus_elsewhere = true;
        assert_eq!(c.handle_key(&key, &mut model).unwrap(), KeyOutcome::Ignored);
        assert!(model.is_empty());
    }

    #[test]
    fn test_duplicate_register_replaces() {
        let mut c = commander();
        c.register(Push).unwrap();
        assert_eq!(c.command_names(), vec!["push", "double"]);
    }

    struct BadKeys;

    impl Command<Vec<i32>, i32> for BadKeys {
        fn name(&self) -> &str {
            "bad"
        }

        fn keyboard(&self) -> &[&str] {
            &["hyper+q"]
        }

        fn execute(&mut self, _: &Vec<i32>, _: i32) -> EditorResult<CommandExecute<Vec<i32>>> {
            Ok(CommandExecute::redo_only(|_: &mut Vec<i32>| {}))
        }
    }

    #[test]
    fn test_invalid_binding_rejected() {
        let mut c = commander();
        assert!(matches!(
            c.register(BadKeys),
            Err(EditorError::InvalidKeyBinding(_))
        ));
        assert!(!c.contains("bad"));
    }

    /// Records a push whenever a drag ends.
    struct OnDragEnd {
        destroyed: Rc<RefCell<u32>>,
    }

    impl Command<Vec<i32>, i32> for OnDragEnd {
        fn name(&self) -> &str {
            "on_drag_end"
        }

        fn init(&mut self, ctx: &mut InitContext<'_, Vec<i32>>) -> Option<Teardown<Vec<i32>>> {
            let dispatcher = ctx.dispatcher.clone();
            let id = ctx.events.dragend.on(move |_| dispatcher.request("push"));
            Some(Box::new(move |events: &mut DragEvents<Vec<i32>>| {
                events.dragend.off(id);
            }))
        }

        fn destroy(&mut self) {
            *self.destroyed.borrow_mut() += 1;
        }

        fn execute(&mut self, _: &Vec<i32>, _: i32) -> EditorResult<CommandExecute<Vec<i32>>> {
            Ok(CommandExecute::redo_only(|_: &mut Vec<i32>| {}))
        }
    }

    #[test]
    fn test_init_dispatch_and_destroy() {
        let destroyed = Rc::new(RefCell::new(0));
        let mut c = commander();
        c.register(OnDragEnd {
            destroyed: destroyed.clone(),
        })
        .unwrap();
        let mut events = DragEvents::new();
        c.init(&mut events);
        c.init(&mut events);
        assert_eq!(events.dragend.len(), 1);

        let mut model = vec![];
        events.end(&model);
        assert_eq!(c.dispatcher().pending(), 1);
        assert_eq!(c.flush(&mut model).unwrap(), 1);
        assert_eq!(model, vec![0]);
        assert_eq!(c.len(), 1);

        c.destroy(&mut events);
        assert!(events.dragend.is_empty());
        assert_eq!(*destroyed.borrow(), 1);
        c.destroy(&mut events);
        assert_eq!(*destroyed.borrow(), 1);

        c.init(&mut events);
        assert_eq!(events.dragend.len(), 1);
        c.destroy(&mut events);
        assert_eq!(*destroyed.borrow(), 2);
    }

    #[test]
    fn test_destroy_skips_uninitialized() {
        let destroyed = Rc::new(RefCell::new(0));
        let mut c = commander();
        c.register(OnDragEnd {
            destroyed: destroyed.clone(),
        })
        .unwrap();
        let mut events = DragEvents::new();
        c.destroy(&mut events);
        assert_eq!(*destroyed.borrow(), 0);
    }
}
