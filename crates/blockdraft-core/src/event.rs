//! Typed publish/subscribe channel.
//!
//! Drag sources that know nothing about each other announce the start and end
//! of a gesture through [`DragEvents`]. Listeners receive the live model so
//! they can take their own snapshot.

use log::debug;

/// Handle returned by [`EventChannel::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<A: ?Sized> {
    id: ListenerId,
    once: bool,
    callback: Box<dyn FnMut(&A)>,
}

/// A list of listeners called synchronously in subscription order.
pub struct EventChannel<A: ?Sized> {
    listeners: Vec<Listener<A>>,
    next_id: u64,
}

impl<A: ?Sized> Default for EventChannel<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> std::fmt::Debug for EventChannel<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<A: ?Sized> EventChannel<A> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    fn subscribe(&mut self, once: bool, callback: Box<dyn FnMut(&A)>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener { id, once, callback });
        id
    }

    /// Subscribe a listener.
    pub fn on(&mut self, listener: impl FnMut(&A) + 'static) -> ListenerId {
        self.subscribe(false, Box::new(listener))
    }

    /// Subscribe a listener that is removed after its first call.
    pub fn once(&mut self, listener: impl FnMut(&A) + 'static) -> ListenerId {
        self.subscribe(true, Box::new(listener))
    }

    /// Unsubscribe. Returns false if the id is not subscribed.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Call every listener with `payload`.
    pub fn emit(&mut self, payload: &A) {
        for listener in &mut self.listeners {
            (listener.callback)(payload);
        }
        self.listeners.retain(|l| !l.once);
    }

    /// Remove every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Gesture boundary signals shared by every drag source.
pub struct DragEvents<M: ?Sized> {
    pub dragstart: EventChannel<M>,
    pub dragend: EventChannel<M>,
}

impl<M: ?Sized> Default for DragEvents<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ?Sized> std::fmt::Debug for DragEvents<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragEvents")
            .field("dragstart", &self.dragstart)
            .field("dragend", &self.dragend)
            .finish()
    }
}

impl<M: ?Sized> DragEvents<M> {
    pub fn new() -> Self {
        Self {
            dragstart: EventChannel::new(),
            dragend: EventChannel::new(),
        }
    }

    /// Signal the start of a gesture.
    pub fn start(&mut self, model: &M) {
        debug!("dragstart ({} listeners)", self.dragstart.len());
        self.dragstart.emit(model);
    }

    /// Signal the end of a gesture.
    pub fn end(&mut self, model: &M) {
        debug!("dragend ({} listeners)", self.dragend.len());
        self.dragend.emit(model);
    }
}
