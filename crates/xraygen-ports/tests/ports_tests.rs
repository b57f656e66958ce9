//! Tests for the default wait helpers on `BrowserPage`.

use anyhow::Result;
use std::cell::Cell;
use std::time::Duration;
use xraygen_ports::{BrowserPage, POLL_INTERVAL};

/// Page whose only element becomes visible after a number of probes.
struct CountdownPage {
    probes_until_visible: Cell<u32>,
    pauses: Cell<u32>,
}

impl CountdownPage {
    fn new(probes: u32) -> Self {
        Self {
            probes_until_visible: Cell::new(probes),
            pauses: Cell::new(0),
        }
    }
}

impl BrowserPage for CountdownPage {
    fn goto(&self, _url: &str) -> Result<()> {
        Ok(())
    }
    fn wait_for_idle(&self) -> Result<()> {
        Ok(())
    }
    fn is_visible(&self, _selector: &str) -> Result<bool> {
        let left = self.probes_until_visible.get();
        if left == 0 {
            return Ok(true);
        }
        self.probes_until_visible.set(left - 1);
        Ok(false)
    }
    fn fill(&self, _selector: &str, _text: &str) -> Result<()> {
        Ok(())
    }
    fn click(&self, _selector: &str) -> Result<()> {
        Ok(())
    }
    fn press(&self, _selector: &str, _key: &str) -> Result<()> {
        Ok(())
    }
    fn set_checked(&self, _selector: &str, _checked: bool) -> Result<()> {
        Ok(())
    }
    fn select_option(&self, _selector: &str, _label: &str) -> Result<()> {
        Ok(())
    }
    fn click_text(&self, _selector: &str, _text: &str) -> Result<bool> {
        Ok(false)
    }
    fn inner_text(&self, _selector: &str) -> Result<String> {
        Ok(String::new())
    }
    fn pause(&self, _duration: Duration) {
        self.pauses.set(self.pauses.get() + 1);
    }
    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[test]
fn wait_for_returns_true_once_visible() {
    let page = CountdownPage::new(3);
    assert!(page.wait_for("#x", Duration::from_secs(1)).unwrap());
    assert_eq!(page.pauses.get(), 3);
}

#[test]
fn wait_for_is_bounded_by_timeout() {
    let page = CountdownPage::new(u32::MAX);
    let timeout = POLL_INTERVAL * 5;
    assert!(!page.wait_for("#x", timeout).unwrap());
    assert_eq!(page.pauses.get(), 5);
}

#[test]
fn wait_until_hidden_succeeds_immediately_for_absent_element() {
    let page = CountdownPage::new(u32::MAX);
    assert!(page.wait_until_hidden("#x", Duration::from_secs(1)).unwrap());
    assert_eq!(page.pauses.get(), 0);
}

#[test]
fn zero_timeout_still_probes_once() {
    let page = CountdownPage::new(0);
    assert!(page.wait_for("#x", Duration::ZERO).unwrap());
}
