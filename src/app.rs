use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::AppConfig;
use crate::document::{Document, DocumentSnapshot, Element, ElementId};
use crate::overlay::{callback, Overlay, OverlayProps, OverlaySize};

/// How long a status message stays on the page
const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

/// Rows scrolled per wheel notch
const WHEEL_STEP: i32 = 3;

const HINT: &str = "Tab moves focus, Enter activates, q quits";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Dialog {
    Confirm,
    Details,
    Sheet,
}

impl Dialog {
    /// Sync order. Stacking follows the order dialogs were opened in.
    pub const ALL: [Dialog; 3] = [Dialog::Confirm, Dialog::Details, Dialog::Sheet];

    fn index(self) -> usize {
        match self {
            Dialog::Confirm => 0,
            Dialog::Details => 1,
            Dialog::Sheet => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Open(Dialog),
    Close(Dialog),
    Status(String),
}

/// Stable ids for the page, so focus survives a rebuild.
struct PageIds {
    heading: ElementId,
    status: ElementId,
    openers: [ElementId; 3],
}

pub struct App {
    document: Document,
    config: AppConfig,
    tx: UnboundedSender<Message>,

    // Open flags are owned here; overlays only ask for them to change
    open: [bool; 3],
    overlays: [Overlay; 3],
    contents: [Vec<Element>; 3],
    page: PageIds,

    // Status message (shown under the heading, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new(config: AppConfig, viewport: Rect) -> (Self, UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let breakpoint = config.narrow_breakpoint;

        let mut app = Self {
            document: Document::new(viewport),
            contents: [
                confirm_content(&tx),
                details_content(&tx),
                sheet_content(),
            ],
            config,
            tx,
            open: [false; 3],
            overlays: std::array::from_fn(|_| Overlay::with_breakpoint(breakpoint)),
            page: PageIds {
                heading: ElementId::new(),
                status: ElementId::new(),
                openers: std::array::from_fn(|_| ElementId::new()),
            },
            status_message: None,
            status_message_time: None,
        };
        app.sync();
        (app, rx)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn is_open(&self, dialog: Dialog) -> bool {
        self.open[dialog.index()]
    }

    pub fn overlay(&self, dialog: Dialog) -> &Overlay {
        &self.overlays[dialog.index()]
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        self.document.snapshot()
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::Open(dialog) => {
                tracing::debug!(?dialog, "open requested");
                self.open[dialog.index()] = true;
            }
            Message::Close(dialog) => {
                tracing::debug!(?dialog, "close requested");
                self.open[dialog.index()] = false;
            }
            Message::Status(text) => {
                self.status_message = Some(text);
                self.status_message_time = Some(Instant::now());
            }
        }
        self.sync();
    }

    /// Apply whatever is already queued, without waiting.
    pub fn drain(&mut self, rx: &mut UnboundedReceiver<Message>) {
        while let Ok(message) = rx.try_recv() {
            self.update(message);
        }
    }

    /// Route one terminal event. Returns true when the app should quit.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => return self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
        false
    }

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') if self.document.layer_count() == 0 => return true,
            _ => {}
        }
        self.document.dispatch_key(key);
        false
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.document.dispatch_click(mouse.column, mouse.row);
            }
            MouseEventKind::ScrollDown => self.document.dispatch_wheel(WHEEL_STEP),
            MouseEventKind::ScrollUp => self.document.dispatch_wheel(-WHEEL_STEP),
            _ => {}
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.document.resize(Rect::new(0, 0, width, height));
    }

    /// Periodic housekeeping: expire the status message.
    pub fn tick(&mut self) {
        let expired = self
            .status_message_time
            .is_some_and(|shown| shown.elapsed() >= STATUS_TIMEOUT);
        if expired {
            self.status_message = None;
            self.status_message_time = None;
            self.sync();
        }
    }

    /// Rebuild the page and hand every overlay its current props.
    fn sync(&mut self) {
        self.document.set_body(self.page());
        for dialog in Dialog::ALL {
            let props = self.props(dialog);
            self.overlays[dialog.index()].sync(&props, Some(&self.document));
        }
    }

    fn props(&self, dialog: Dialog) -> OverlayProps {
        let defaults = &self.config.overlay;
        let tx = self.tx.clone();
        let on_close = callback(move || {
            let _ = tx.send(Message::Close(dialog));
        });
        let props = OverlayProps::new(self.is_open(dialog), on_close)
            .content(self.contents[dialog.index()].clone());

        match dialog {
            Dialog::Confirm => props
                .title("Confirm")
                .size(OverlaySize::Small)
                .close_on_escape(defaults.close_on_escape)
                .close_on_backdrop_click(defaults.close_on_backdrop_click),
            Dialog::Details => props
                .title("Account details")
                .size(defaults.size)
                .close_on_escape(defaults.close_on_escape)
                .close_on_backdrop_click(defaults.close_on_backdrop_click),
            Dialog::Sheet => props
                .title("Keyboard shortcuts")
                .size(OverlaySize::Medium)
                .close_on_escape(false)
                .close_on_backdrop_click(false),
        }
    }

    fn page(&self) -> Vec<Element> {
        let status = self.status_message.as_deref().unwrap_or(HINT);
        let mut elements = vec![
            Element::text("scrim  ·  modal overlays for the terminal").with_id(self.page.heading),
            Element::text(status).with_id(self.page.status),
            Element::text(""),
        ];

        let labels = [
            "Discard draft…",
            "Account details…",
            "Keyboard shortcuts…",
        ];
        for dialog in Dialog::ALL {
            let tx = self.tx.clone();
            elements.push(
                Element::button(labels[dialog.index()])
                    .with_id(self.page.openers[dialog.index()])
                    .on_activate(callback(move || {
                        let _ = tx.send(Message::Open(dialog));
                    })),
            );
        }

        elements.push(Element::text(""));
        elements.extend(PAGE_NOTES.iter().map(|note| Element::text(*note)));
        elements
    }
}

const PAGE_NOTES: &[&str] = &[
    "While a dialog is open the page behind it stops scrolling.",
    "The scrollbar column is kept as padding, so nothing shifts sideways.",
    "Escape closes the top-most dialog unless it opted out.",
    "Clicking the dimmed area around a panel closes it, when allowed.",
    "The close control in the corner always works.",
    "Tab and Shift-Tab cycle inside the panel and never reach the page.",
    "When a dialog closes, focus goes back to whatever opened it.",
    "Dialogs can open other dialogs; only the top one listens.",
    "Narrow terminals get a sheet pinned to the bottom edge.",
    "Long dialog content scrolls inside the panel.",
    "",
    "Filler follows so the page is taller than most terminals.",
    "",
    "Nothing to see here.",
    "Row after row of ordinary page content.",
    "More rows, nothing interesting here.",
    "Still scrolling.",
    "Almost there.",
    "A few more.",
    "Keep going.",
    "Nearly at the end.",
    "One more line.",
    "And another.",
    "The wheel scrolls three rows at a time.",
    "PageUp and PageDown move a screen at a time.",
    "Home and End jump to either edge.",
    "Open a dialog and try the wheel again.",
    "End of page.",
];

fn confirm_content(tx: &UnboundedSender<Message>) -> Vec<Element> {
    let discard = {
        let tx = tx.clone();
        callback(move || {
            let _ = tx.send(Message::Status("Draft discarded".to_string()));
            let _ = tx.send(Message::Close(Dialog::Confirm));
        })
    };
    let keep = {
        let tx = tx.clone();
        callback(move || {
            let _ = tx.send(Message::Close(Dialog::Confirm));
        })
    };
    vec![
        Element::text("Discard the draft you were editing?"),
        Element::text(""),
        Element::button("Discard").on_activate(discard),
        Element::button("Keep editing").on_activate(keep),
    ]
}

fn details_content(tx: &UnboundedSender<Message>) -> Vec<Element> {
    let confirm = {
        let tx = tx.clone();
        callback(move || {
            let _ = tx.send(Message::Open(Dialog::Confirm));
        })
    };
    let done = {
        let tx = tx.clone();
        callback(move || {
            let _ = tx.send(Message::Status("Details saved".to_string()));
            let _ = tx.send(Message::Close(Dialog::Details));
        })
    };

    let mut elements = vec![
        Element::input("Name", "Ada Lovelace"),
        Element::select(
            "Plan",
            vec!["Free".to_string(), "Team".to_string(), "Enterprise".to_string()],
            1,
        ),
        Element::textarea("Notes", "Prefers email.\nInvoices go to finance."),
        Element::link("Billing docs", "https://example.org/billing"),
        Element::button("Discard draft…").on_activate(confirm),
        Element::text(""),
    ];
    elements.extend((1..=16).map(|i| Element::text(format!("Invoice #{:04}  paid", 1000 + i))));
    elements.push(Element::button("Done").on_activate(done));
    elements
}

fn sheet_content() -> Vec<Element> {
    vec![
        Element::text("Tab / Shift-Tab   move focus"),
        Element::text("Enter / Space     activate"),
        Element::text("Esc               close (when allowed)"),
        Element::text("Wheel, PgUp/PgDn  scroll the page"),
        Element::text(""),
        Element::custom("Focusable card", Some(0)),
        Element::custom("Skipped by Tab", Some(-1)),
        Element::text(""),
        Element::text("Only the close control dismisses this sheet."),
    ]
}
