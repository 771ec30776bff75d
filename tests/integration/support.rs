//! Shared fixtures: a scripted page source, a no-op sleeper and HTML pages

use async_trait::async_trait;
use kanji_vocab::crawler::{PageFetcher, Sleeper};
use kanji_vocab::state::PageResult;
use kanji_vocab::vocab::{CharacterInfo, Entry};
use kanji_vocab::{FetchError, FetchResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Sleeper that returns immediately
pub struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

/// How one page behaves
#[derive(Debug, Clone)]
pub struct PageScript {
    pub words: Vec<String>,
    pub has_next: bool,
    /// Transient failures before the first success; `u32::MAX` never succeeds
    pub fail_times: u32,
    pub permanent: bool,
    /// Calls that panic before the page behaves normally
    pub panic_times: u32,
    pub delay: Duration,
}

impl PageScript {
    pub fn new(words: &[&str], has_next: bool) -> Self {
        Self {
            words: words.iter().map(|w| w.to_string()).collect(),
            has_next,
            fail_times: 0,
            permanent: false,
            panic_times: 0,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(mut self, times: u32) -> Self {
        self.fail_times = times;
        self
    }

    pub fn unparseable(mut self) -> Self {
        self.permanent = true;
        self
    }

    pub fn panicking(mut self, times: u32) -> Self {
        self.panic_times = times;
        self
    }

    pub fn delayed(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }
}

/// In-memory page source with per-page scripts
///
/// Pages without a script behave like the site past its last page: an
/// empty page without a "more" link.
pub struct ScriptedFetcher {
    pages: HashMap<u32, PageScript>,
    attempts: Mutex<HashMap<u32, u32>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    pub fn page(mut self, index: u32, script: PageScript) -> Self {
        self.pages.insert(index, script);
        self
    }

    /// `total` pages with two distinct words each; the last has no successor
    pub fn linear(total: u32) -> Self {
        (1..=total).fold(Self::new(), |fetcher, i| {
            let a = format!("人{}a", i);
            let b = format!("人{}b", i);
            fetcher.page(i, PageScript::new(&[&a, &b], i < total))
        })
    }

    /// Number of calls made for the page
    pub fn attempts(&self, index: u32) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(&index)
            .copied()
            .unwrap_or(0)
    }

    /// Every page index that was requested at least once
    pub fn requested_pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.attempts.lock().unwrap().keys().copied().collect();
        pages.sort_unstable();
        pages
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, _target: char, page_index: u32) -> FetchResult<PageResult> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(page_index).or_insert(0);
            *count += 1;
            *count
        };

        let Some(script) = self.pages.get(&page_index) else {
            return Ok(PageResult::new(page_index, vec![], false));
        };

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }

        if attempt <= script.panic_times {
            panic!("scripted panic on page {}", page_index);
        }

        if script.permanent {
            return Err(FetchError::PermanentParse {
                page: page_index,
                message: "no recognizable results layout".to_string(),
            });
        }

        if attempt <= script.fail_times {
            return Err(FetchError::Transient {
                page: page_index,
                message: format!("HTTP 503 (attempt {})", attempt),
            });
        }

        let entries = script
            .words
            .iter()
            .map(|w| Entry::new(w.as_str(), "ひと").with_gloss(format!("page {}", page_index)))
            .collect();
        let mut result = PageResult::new(page_index, entries, script.has_next);

        if page_index == 1 {
            result = result.with_character_info(CharacterInfo {
                onyomi: vec!["ジン".to_string(), "ニン".to_string()],
                kunyomi: vec!["ひと".to_string()],
                meaning: "person".to_string(),
                info: String::new(),
            });
        }

        Ok(result)
    }
}

/// Surface forms of entries, for compact assertions
pub fn surfaces(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.surface_form.as_str()).collect()
}

/// One vocabulary block in the site's result markup
pub fn concept_html(surface: &str, furigana: &str, meaning: &str) -> String {
    format!(
        r#"<div class="concept_light clearfix">
             <div class="concept_light-representation">
               <span class="furigana"><span>{}</span></span>
               <span class="text">{}</span>
             </div>
             <div class="concept_light-status">
               <span class="concept_light-tag concept_light-common success label">Common word</span>
             </div>
             <div class="meanings-wrapper">
               <div class="meaning-tags">Noun</div>
               <div class="meaning-wrapper"><div class="meaning-definition">
                 <span class="meaning-meaning">{}</span>
               </div></div>
             </div>
           </div>"#,
        furigana, surface, meaning
    )
}

/// A complete result page
pub fn result_page_html(concepts: &[String], has_next: bool, with_kanji_block: bool) -> String {
    let kanji_block = if with_kanji_block {
        r#"<div class="kanji_light_content">
             <div class="on readings"><span class="type">On:</span> <a>ジン</a>、 <a>ニン</a></div>
             <div class="kun readings"><span class="type">Kun:</span> <a>ひと</a></div>
             <div class="meanings english sense"><span>person</span></div>
           </div>"#
    } else {
        ""
    };
    let more = if has_next {
        r#"<a class="more" href="?page=next">More Words &gt;</a>"#
    } else {
        ""
    };

    format!(
        r#"<html><head><title>results</title></head><body>
           <div id="main_results">{}{}{}</div>
           </body></html>"#,
        kanji_block,
        concepts.join("\n"),
        more
    )
}
