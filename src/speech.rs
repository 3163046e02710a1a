//! Brug naar spraakherkenning en spraaksynthese van de browser.
//!
//! Browsers zonder ondersteuning krijgen een inerte bridge: `speak` doet
//! niets en `recognize` geeft [`SpeechError::Unsupported`] terug. De rest van
//! de viewer blijft gewoon werken.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// De browser biedt de gevraagde spraak-API niet aan.
    #[error("spraak-API wordt niet ondersteund door deze browser")]
    Unsupported,
    /// De herkenning is afgebroken via `cancel`.
    #[error("spraakherkenning afgebroken")]
    Aborted,
    #[error("fout in spraak-API van de browser: {0}")]
    Browser(String),
}

/// BCP-47 taalcode voor een taalnaam uit het rapport.
#[must_use]
pub fn language_tag(language: &str) -> Option<&'static str> {
    match language.trim().to_ascii_lowercase().as_str() {
        "english" => Some("en-US"),
        "hindi" => Some("hi-IN"),
        _ => None,
    }
}

/// Voegt deeltranscripties samen met één spatie ertussen.
#[must_use]
pub fn combine_transcripts<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter_map(|part| {
            let trimmed = part.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uit te spreken tekst met optionele taalcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub lang: Option<&'static str>,
}

impl Utterance {
    /// `None` voor lege tekst.
    #[must_use]
    pub fn prepare(language: &str, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_owned(),
            lang: language_tag(language),
        })
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{SpeechRecognizer, SpeechSynthesizer};

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::RefCell;

    use js_sys::{Array, Function, Promise, Reflect};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    use super::{SpeechError, Utterance, combine_transcripts};

    /// Spraaksynthese via `window.speechSynthesis`.
    pub struct SpeechSynthesizer {
        synth: Option<web_sys::SpeechSynthesis>,
    }

    impl SpeechSynthesizer {
        #[must_use]
        pub fn new() -> Self {
            let synth = web_sys::window().and_then(|window| window.speech_synthesis().ok());
            if synth.is_none() {
                log::error!("spraaksynthese wordt niet ondersteund door deze browser");
            }
            Self { synth }
        }

        #[must_use]
        pub fn is_supported(&self) -> bool {
            self.synth.is_some()
        }

        pub fn speak(&self, language: &str, text: &str) -> Result<(), SpeechError> {
            let Some(synth) = self.synth.as_ref() else {
                return Ok(());
            };
            let Some(utterance) = Utterance::prepare(language, text) else {
                return Ok(());
            };

            let js_utterance = web_sys::SpeechSynthesisUtterance::new_with_text(&utterance.text)
                .map_err(|err| SpeechError::Browser(describe(&err)))?;
            if let Some(lang) = utterance.lang {
                js_utterance.set_lang(lang);
            }
            synth.speak(&js_utterance);
            Ok(())
        }
    }

    impl Default for SpeechSynthesizer {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Spraakherkenning via `SpeechRecognition` of `webkitSpeechRecognition`.
    pub struct SpeechRecognizer {
        constructor: Option<Function>,
        active: RefCell<Option<JsValue>>,
    }

    impl SpeechRecognizer {
        #[must_use]
        pub fn new() -> Self {
            let constructor = web_sys::window().and_then(|window| {
                ["SpeechRecognition", "webkitSpeechRecognition"]
                    .iter()
                    .find_map(|name| {
                        Reflect::get(&window, &JsValue::from_str(name))
                            .ok()
                            .and_then(|value| value.dyn_into::<Function>().ok())
                    })
            });
            if constructor.is_none() {
                log::error!("spraakherkenning wordt niet ondersteund door deze browser");
            }
            Self {
                constructor,
                active: RefCell::new(None),
            }
        }

        #[must_use]
        pub fn is_supported(&self) -> bool {
            self.constructor.is_some()
        }

        /// Start één herkenningsronde en wacht op het resultaat.
        pub async fn recognize(&self) -> Result<String, SpeechError> {
            let constructor = self.constructor.as_ref().ok_or(SpeechError::Unsupported)?;
            let recognition = Reflect::construct(constructor, &Array::new())
                .map_err(|err| SpeechError::Browser(describe(&err)))?;

            let mut resolvers: Option<(Function, Function)> = None;
            let promise = Promise::new(&mut |resolve: Function, reject: Function| {
                resolvers = Some((resolve, reject));
            });
            let (resolve, reject) = resolvers
                .ok_or_else(|| SpeechError::Browser("promise zonder resolvers".to_owned()))?;

            let on_result = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
                let transcript = transcripts_from_event(&event);
                let _ = resolve.call1(&JsValue::NULL, &JsValue::from_str(&transcript));
            });
            let on_error = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
                let _ = reject.call1(&JsValue::NULL, &event);
            });
            let _ = Reflect::set(&recognition, &JsValue::from_str("onresult"), on_result.as_ref());
            let _ = Reflect::set(&recognition, &JsValue::from_str("onerror"), on_error.as_ref());

            if let Err(err) = call_method(&recognition, "start") {
                detach_handlers(&recognition);
                return Err(SpeechError::Browser(describe(&err)));
            }
            self.active.replace(Some(recognition));

            let outcome = JsFuture::from(promise).await;
            if let Some(recognition) = self.active.replace(None) {
                detach_handlers(&recognition);
            }
            // beide handlers zijn los; de closures mogen nu vrijkomen
            drop(on_result);
            drop(on_error);

            match outcome {
                Ok(value) => Ok(value.as_string().unwrap_or_default()),
                Err(event) => {
                    let reason = Reflect::get(&event, &JsValue::from_str("error"))
                        .ok()
                        .and_then(|value| value.as_string())
                        .unwrap_or_else(|| describe(&event));
                    if reason == "aborted" {
                        Err(SpeechError::Aborted)
                    } else {
                        Err(SpeechError::Browser(reason))
                    }
                }
            }
        }

        /// Breekt een lopende herkenning af.
        pub fn cancel(&self) {
            if let Some(recognition) = self.active.borrow().as_ref() {
                if let Err(err) = call_method(recognition, "abort") {
                    log::warn!("afbreken van spraakherkenning mislukt: {}", describe(&err));
                }
            }
        }
    }

    impl Default for SpeechRecognizer {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Ontkoppelt de handlers zodat JS ze na afloop niet meer aanroept.
    fn detach_handlers(recognition: &JsValue) {
        for handler in ["onresult", "onerror"] {
            let _ = Reflect::set(recognition, &JsValue::from_str(handler), &JsValue::NULL);
        }
    }

    fn call_method(target: &JsValue, name: &str) -> Result<JsValue, JsValue> {
        let method: Function = Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
        method.call0(target)
    }

    fn transcripts_from_event(event: &JsValue) -> String {
        let Ok(results) = Reflect::get(event, &JsValue::from_str("results")) else {
            return String::new();
        };
        let length = Reflect::get(&results, &JsValue::from_str("length"))
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0) as u32;

        let parts = (0..length).filter_map(|idx| {
            let result = Reflect::get(&results, &JsValue::from(idx)).ok()?;
            let alternative = Reflect::get(&result, &JsValue::from(0_u32)).ok()?;
            Reflect::get(&alternative, &JsValue::from_str("transcript"))
                .ok()?
                .as_string()
        });
        combine_transcripts(parts)
    }

    fn describe(value: &JsValue) -> String {
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"))
    }
}
