use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    PointerDown(u16, u16),
    /// Every drag position read since the previous batch, oldest first.
    PointerDrag(Vec<(u16, u16)>),
    PointerUp(u16, u16),
    /// Buttonless movement, only reported when hover input is on.
    Hover(u16, u16),
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

fn is_left_drag(event: &Event) -> bool {
    matches!(
        event,
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            ..
        })
    )
}

fn translate(event: Event, hover: bool) -> Option<AppEvent> {
    match event {
        Event::Key(key) => Some(AppEvent::Key(key)),
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(AppEvent::PointerDown(mouse.column, mouse.row)),
            MouseEventKind::Drag(MouseButton::Left) => {
                Some(AppEvent::PointerDrag(vec![(mouse.column, mouse.row)]))
            }
            MouseEventKind::Up(MouseButton::Left) => Some(AppEvent::PointerUp(mouse.column, mouse.row)),
            MouseEventKind::Moved if hover => Some(AppEvent::Hover(mouse.column, mouse.row)),
            _ => None,
        },
        _ => None,
    }
}

/// Reads any drag events already queued behind `first` so that a fast swipe
/// arrives as one batch. Returns the batch and the first non-drag event, if
/// one was read.
fn coalesce_drags(first: (u16, u16)) -> (Vec<(u16, u16)>, Option<Event>) {
    let mut batch = vec![first];
    while event::poll(Duration::ZERO).unwrap_or(false) {
        match event::read() {
            Ok(next) if is_left_drag(&next) => {
                if let Event::Mouse(mouse) = next {
                    batch.push((mouse.column, mouse.row));
                }
            }
            Ok(other) => return (batch, Some(other)),
            Err(_) => break,
        }
    }
    (batch, None)
}

impl EventHandler {
    /// With `hover` set, buttonless mouse movement is forwarded as
    /// [`AppEvent::Hover`].
    pub fn new(tick_rate: Duration, hover: bool) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            let mut deferred: Option<Event> = None;
            loop {
                let next = match deferred.take() {
                    Some(event) => Some(event),
                    None if event::poll(tick_rate).unwrap_or(false) => event::read().ok(),
                    None => {
                        if tx.send(AppEvent::Tick).is_err() {
                            return;
                        }
                        continue;
                    }
                };

                let Some(app_event) = next.and_then(|event| translate(event, hover)) else {
                    continue;
                };
                let app_event = match app_event {
                    AppEvent::PointerDrag(first) => {
                        let (batch, after) = coalesce_drags(first[0]);
                        deferred = after;
                        AppEvent::PointerDrag(batch)
                    }
                    other => other,
                };
                if tx.send(app_event).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
