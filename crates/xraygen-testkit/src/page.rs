use anyhow::{Result, anyhow, bail};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::time::Duration;
use xraygen_ports::{BrowserLauncher, BrowserPage};

/// Everything a [`ScriptedPage`] was asked to do, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageAction {
    Goto(String),
    WaitForIdle,
    Fill { selector: String, text: String },
    Click(String),
    Press { selector: String, key: String },
    SetChecked { selector: String, checked: bool },
    SelectOption { selector: String, label: String },
    ClickText { selector: String, text: String },
    Close,
}

/// The mutable DOM stand-in behind a scripted page.
#[derive(Debug, Default)]
pub struct PageState {
    visible: BTreeSet<String>,
    texts: BTreeMap<String, String>,
    checked: BTreeMap<String, bool>,
    options: BTreeMap<String, BTreeSet<String>>,
    text_targets: BTreeSet<(String, String)>,
    actions: Vec<PageAction>,
    pauses: Vec<Duration>,
    closed: bool,
}

impl PageState {
    pub fn show(&mut self, selector: &str) {
        self.visible.insert(selector.to_string());
    }

    pub fn hide(&mut self, selector: &str) {
        self.visible.remove(selector);
    }

    pub fn set_text(&mut self, selector: &str, text: &str) {
        self.texts.insert(selector.to_string(), text.to_string());
    }

    pub fn is_visible(&self, selector: &str) -> bool {
        self.visible.contains(selector)
    }

    pub fn is_checked(&self, selector: &str) -> bool {
        self.checked.get(selector).copied().unwrap_or(false)
    }

    fn require(&self, selector: &str) -> Result<()> {
        if self.closed {
            bail!("page is closed");
        }
        if !self.visible.contains(selector) {
            bail!("no visible element matches {selector}");
        }
        Ok(())
    }
}

type Reaction = Box<dyn FnMut(&mut PageState)>;

/// In-memory [`BrowserPage`] driven by a script of visible selectors and
/// click reactions. Clones share state, so a test can keep a handle and
/// inspect the action log after the page has been boxed and closed.
#[derive(Clone, Default)]
pub struct ScriptedPage {
    state: Rc<RefCell<PageState>>,
    reactions: Rc<RefCell<Vec<(String, Reaction)>>>,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visible(self, selectors: &[&str]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            for selector in selectors {
                state.show(selector);
            }
        }
        self
    }

    pub fn with_text(self, selector: &str, text: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.show(selector);
            state.set_text(selector, text);
        }
        self
    }

    pub fn with_options(self, selector: &str, labels: &[&str]) -> Self {
        self.state.borrow_mut().options.insert(
            selector.to_string(),
            labels.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    /// Make `click_text(selector, text)` find a match.
    pub fn with_text_target(self, selector: &str, text: &str) -> Self {
        self.state
            .borrow_mut()
            .text_targets
            .insert((selector.to_string(), text.to_string()));
        self
    }

    /// Run `reaction` every time `selector` is clicked.
    pub fn on_click(self, selector: &str, reaction: impl FnMut(&mut PageState) + 'static) -> Self {
        self.reactions
            .borrow_mut()
            .push((selector.to_string(), Box::new(reaction)));
        self
    }

    pub fn actions(&self) -> Vec<PageAction> {
        self.state.borrow().actions.clone()
    }

    pub fn clicks(&self, selector: &str) -> usize {
        self.state
            .borrow()
            .actions
            .iter()
            .filter(|a| matches!(a, PageAction::Click(s) if s == selector))
            .count()
    }

    pub fn fills(&self, selector: &str) -> Vec<String> {
        self.state
            .borrow()
            .actions
            .iter()
            .filter_map(|a| match a {
                PageAction::Fill { selector: s, text } if s == selector => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.state.borrow().pauses.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    pub fn is_checked(&self, selector: &str) -> bool {
        self.state.borrow().is_checked(selector)
    }

    fn record(&self, action: PageAction) {
        self.state.borrow_mut().actions.push(action);
    }

    fn react(&self, selector: &str) {
        let mut reactions = self.reactions.borrow_mut();
        let mut state = self.state.borrow_mut();
        for (target, reaction) in reactions.iter_mut() {
            if target == selector {
                reaction(&mut state);
            }
        }
    }
}

impl BrowserPage for ScriptedPage {
    fn goto(&self, url: &str) -> Result<()> {
        if self.state.borrow().closed {
            bail!("page is closed");
        }
        self.record(PageAction::Goto(url.to_string()));
        Ok(())
    }

    fn wait_for_idle(&self) -> Result<()> {
        self.record(PageAction::WaitForIdle);
        Ok(())
    }

    fn is_visible(&self, selector: &str) -> Result<bool> {
        Ok(self.state.borrow().is_visible(selector))
    }

    fn fill(&self, selector: &str, text: &str) -> Result<()> {
        self.state.borrow().require(selector)?;
        self.record(PageAction::Fill {
            selector: selector.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn click(&self, selector: &str) -> Result<()> {
        self.state.borrow().require(selector)?;
        self.record(PageAction::Click(selector.to_string()));
        self.react(selector);
        Ok(())
    }

    fn press(&self, selector: &str, key: &str) -> Result<()> {
        self.state.borrow().require(selector)?;
        self.record(PageAction::Press {
            selector: selector.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    fn set_checked(&self, selector: &str, checked: bool) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.require(selector)?;
        state.checked.insert(selector.to_string(), checked);
        state.actions.push(PageAction::SetChecked {
            selector: selector.to_string(),
            checked,
        });
        Ok(())
    }

    fn select_option(&self, selector: &str, label: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.require(selector)?;
        let known = state
            .options
            .get(selector)
            .is_none_or(|labels| labels.contains(label));
        if !known {
            return Err(anyhow!("{selector} has no option labelled {label:?}"));
        }
        state.actions.push(PageAction::SelectOption {
            selector: selector.to_string(),
            label: label.to_string(),
        });
        Ok(())
    }

    fn click_text(&self, selector: &str, text: &str) -> Result<bool> {
        let found = self
            .state
            .borrow()
            .text_targets
            .contains(&(selector.to_string(), text.to_string()));
        if found {
            self.record(PageAction::ClickText {
                selector: selector.to_string(),
                text: text.to_string(),
            });
        }
        Ok(found)
    }

    fn inner_text(&self, selector: &str) -> Result<String> {
        let state = self.state.borrow();
        state.require(selector)?;
        Ok(state.texts.get(selector).cloned().unwrap_or_default())
    }

    fn pause(&self, duration: Duration) {
        self.state.borrow_mut().pauses.push(duration);
    }

    fn close(self: Box<Self>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.closed = true;
        state.actions.push(PageAction::Close);
        Ok(())
    }
}

/// Hands out clones of one scripted page and counts launches.
#[derive(Clone, Default)]
pub struct ScriptedLauncher {
    page: ScriptedPage,
    launches: Rc<Cell<usize>>,
    failure: Option<String>,
}

impl ScriptedLauncher {
    pub fn new(page: ScriptedPage) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// A launcher whose every launch fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn page(&self) -> &ScriptedPage {
        &self.page
    }

    pub fn launches(&self) -> usize {
        self.launches.get()
    }
}

impl BrowserLauncher for ScriptedLauncher {
    fn launch(&self) -> Result<Box<dyn BrowserPage>> {
        self.launches.set(self.launches.get() + 1);
        if let Some(message) = &self.failure {
            bail!("{message}");
        }
        Ok(Box::new(self.page.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_runs_reactions_and_records() {
        let page = ScriptedPage::new()
            .with_visible(&["#go"])
            .on_click("#go", |state| state.show("#done"));
        page.click("#go").unwrap();
        assert!(page.is_visible("#done").unwrap());
        assert_eq!(page.clicks("#go"), 1);
    }

    #[test]
    fn invisible_targets_error() {
        let page = ScriptedPage::new();
        assert!(page.fill("#missing", "x").is_err());
        assert!(page.click("#missing").is_err());
        assert!(page.actions().is_empty());
    }

    #[test]
    fn clones_share_state_through_close() {
        let page = ScriptedPage::new();
        let handle = page.clone();
        Box::new(page).close().unwrap();
        assert!(handle.is_closed());
        assert_eq!(handle.actions(), vec![PageAction::Close]);
    }

    #[test]
    fn launcher_counts_and_can_fail() {
        let launcher = ScriptedLauncher::new(ScriptedPage::new());
        assert!(launcher.launch().is_ok());
        assert!(launcher.launch().is_ok());
        assert_eq!(launcher.launches(), 2);

        let broken = ScriptedLauncher::failing("no chrome");
        let err = broken.launch().err().unwrap();
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn select_option_checks_known_labels() {
        let page = ScriptedPage::new()
            .with_visible(&["#type"])
            .with_options("#type", &["Manual", "Cucumber"]);
        assert!(page.select_option("#type", "Cucumber").is_ok());
        assert!(page.select_option("#type", "Generic").is_err());
    }
}
