//! Value tweens
//!
//! A [`Tween`] interpolates one named property of an [`Object`] between two
//! values, one write per frame. The values may carry text around their
//! numeric core (`"12px"`, `"20%"`, `"translateX(4px)"`); the text is kept
//! and only the number moves.
//!
//! # Example
//!
//! ```rust
//! use ellibre_animation::{ManualFrameDriver, Tween};
//! use ellibre_core::{Object, Value};
//! use std::rc::Rc;
//!
//! let driver = Rc::new(ManualFrameDriver::new());
//! let style = Object::new();
//!
//! Tween::new("left", "0px", "100px", 200.0)
//!     .style("softPop")
//!     .start(&driver, &style)
//!     .unwrap();
//!
//! driver.run_frame(200.0);
//! assert_eq!(style.get("left"), Value::from("100px"));
//! ```

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;

use ellibre_core::{format_number, Object, Value};
use regex::Regex;
use tracing::{debug, trace};

use crate::easing::Easing;
use crate::error::AnimateError;
use crate::scheduler::FrameDriver;

/// Completion callback, invoked once after the final frame
pub type CompletionCallback = Box<dyn FnOnce()>;

fn numeric_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[-0-9.]+").ok()).as_ref()
}

/// A value split around its first numeric run
#[derive(Clone, Debug, PartialEq)]
pub struct Animatable {
    pub prefix: String,
    pub number: f64,
    pub suffix: String,
}

impl Animatable {
    /// Split the string form of `value` into prefix, number and suffix
    pub fn parse(value: &Value) -> Result<Self, AnimateError> {
        let text = value.to_string();
        let not_numeric = || AnimateError::NotNumeric(text.clone());

        let found = numeric_pattern()
            .and_then(|pattern| pattern.find(&text))
            .ok_or_else(not_numeric)?;
        let number = found.as_str().parse::<f64>().map_err(|_| not_numeric())?;

        Ok(Self {
            prefix: text[..found.start()].to_string(),
            number,
            suffix: text[found.end()..].to_string(),
        })
    }

    /// Render `number` with this value's surrounding text
    pub fn format(&self, number: f64) -> String {
        format!("{}{}{}", self.prefix, format_number(number), self.suffix)
    }

    fn is_bare(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }
}

/// Builder for a single property animation
pub struct Tween {
    property: String,
    from: Value,
    to: Value,
    duration_ms: f64,
    power: f64,
    easing: Easing,
    on_complete: Option<CompletionCallback>,
}

impl Tween {
    pub fn new(
        property: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
        duration_ms: f64,
    ) -> Self {
        Self {
            property: property.into(),
            from: from.into(),
            to: to.into(),
            duration_ms,
            power: 1.0,
            easing: Easing::Pop,
            on_complete: None,
        }
    }

    /// Exponent shaping the easing curve; 0 means 1
    pub fn power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Select the easing curve by name (`pop`, `softPop`, `peek`)
    pub fn style(mut self, name: &str) -> Self {
        self.easing = Easing::from_name(name);
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Schedule the first frame. Nothing is written until it runs.
    pub fn start<D>(self, driver: &Rc<D>, target: &Object) -> Result<(), AnimateError>
    where
        D: FrameDriver + 'static,
    {
        let from = Animatable::parse(&self.from)?;
        let to = Animatable::parse(&self.to)?;

        let driver: Rc<dyn FrameDriver> = driver.clone();
        let power = if self.power == 0.0 { 1.0 } else { self.power };

        debug!(
            property = %self.property,
            from = %self.from,
            to = %self.to,
            duration_ms = self.duration_ms,
            easing = self.easing.name(),
            "tween started"
        );

        let run = Rc::new(TweenRun {
            driver: Rc::downgrade(&driver),
            target: target.clone(),
            numeric_output: matches!(self.from, Value::Number(_)) && from.is_bare(),
            spread: to.number - from.number,
            from,
            property: self.property,
            duration_ms: self.duration_ms,
            power,
            easing: self.easing,
            start: driver.now(),
            on_complete: Cell::new(self.on_complete),
        });
        schedule(&driver, run);
        Ok(())
    }
}

/// Animate `property` of `target` with the default `pop` curve and power 1
pub fn animate<D>(
    driver: &Rc<D>,
    target: &Object,
    property: &str,
    from: impl Into<Value>,
    to: impl Into<Value>,
    duration_ms: f64,
) -> Result<(), AnimateError>
where
    D: FrameDriver + 'static,
{
    Tween::new(property, from, to, duration_ms).start(driver, target)
}

struct TweenRun {
    driver: Weak<dyn FrameDriver>,
    target: Object,
    property: String,
    from: Animatable,
    spread: f64,
    numeric_output: bool,
    duration_ms: f64,
    power: f64,
    easing: Easing,
    start: f64,
    on_complete: Cell<Option<CompletionCallback>>,
}

impl TweenRun {
    fn output(&self, number: f64) -> Value {
        if self.numeric_output {
            Value::Number(number)
        } else {
            Value::Text(self.from.format(number))
        }
    }
}

fn schedule(driver: &Rc<dyn FrameDriver>, run: Rc<TweenRun>) {
    driver.request_frame(Box::new(move |now| step(run, now)));
}

fn step(run: Rc<TweenRun>, now: f64) {
    // The driver owns the pending callback; once it is gone the tween ends
    let Some(driver) = run.driver.upgrade() else {
        return;
    };

    let elapsed = now - run.start;
    if elapsed < 0.0 {
        schedule(&driver, run);
        return;
    }

    let progress = if run.duration_ms > 0.0 {
        elapsed / run.duration_ms
    } else {
        1.0
    };
    let number = run.from.number + run.spread * run.easing.apply(progress, run.power);
    let value = run.output(number);
    trace!(property = %run.property, elapsed, %value, "tween frame");
    run.target.set(&run.property, value);

    if elapsed < run.duration_ms {
        schedule(&driver, run);
        return;
    }

    debug!(property = %run.property, elapsed, "tween finished");
    if let Some(on_complete) = run.on_complete.take() {
        on_complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualFrameDriver;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_parse_keeps_surrounding_text() {
        let parsed = Animatable::parse(&text("translateX(-4.5px)")).unwrap();
        assert_eq!(
            parsed,
            Animatable {
                prefix: "translateX(".to_string(),
                number: -4.5,
                suffix: "px)".to_string(),
            }
        );
        assert_eq!(parsed.format(12.0), "translateX(12px)");
        assert_eq!(parsed.format(-0.0), "translateX(0px)");
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(
            Animatable::parse(&text("auto")).unwrap_err(),
            AnimateError::NotNumeric("auto".to_string())
        );
        // the run is found but is not a number
        assert!(Animatable::parse(&text("1-2px")).is_err());
        assert!(Animatable::parse(&Value::Undefined).is_err());
    }

    #[test]
    fn test_start_rejects_non_numeric_endpoints() {
        let driver = Rc::new(ManualFrameDriver::new());
        let style = Object::new();

        let err = Tween::new("left", "auto", "10px", 100.0)
            .start(&driver, &style)
            .unwrap_err();
        assert_eq!(err, AnimateError::NotNumeric("auto".to_string()));

        assert!(animate(&driver, &style, "left", "0px", "none", 100.0).is_err());
        assert_eq!(driver.pending(), 0);
        assert!(!style.has("left"));
    }

    #[test]
    fn test_pixels_from_start_to_end() {
        let driver = Rc::new(ManualFrameDriver::new());
        let style = Object::new();
        let done = Rc::new(Cell::new(0));
        let counter = done.clone();

        Tween::new("left", "0px", "100px", 200.0)
            .on_complete(move || counter.set(counter.get() + 1))
            .start(&driver, &style)
            .unwrap();
        assert!(!style.has("left"));

        driver.run_frame(0.0);
        assert_eq!(style.get("left"), text("0px"));

        driver.run_frame(100.0);
        let halfway = Animatable::parse(&style.get("left")).unwrap();
        // pop is slow at first
        assert!(halfway.number > 0.0 && halfway.number < 50.0);
        assert_eq!(halfway.suffix, "px");
        assert_eq!(done.get(), 0);

        driver.run_frame(200.0);
        assert_eq!(style.get("left"), text("100px"));
        assert_eq!(done.get(), 1);

        assert_eq!(driver.pending(), 0);
        driver.run_frame(300.0);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn test_early_frames_are_skipped() {
        let driver = Rc::new(ManualFrameDriver::new());
        driver.set_time(1000.0);
        let style = Object::new();

        animate(&driver, &style, "opacity", 0.0, 1.0, 100.0).unwrap();
        driver.run_frame(990.0);
        assert!(!style.has("opacity"));
        assert_eq!(driver.pending(), 1);

        driver.run_frame(1100.0);
        assert_eq!(style.get("opacity"), Value::Number(1.0));
    }

    #[test]
    fn test_last_frame_is_not_clamped() {
        let driver = Rc::new(ManualFrameDriver::new());
        let style = Object::new();

        Tween::new("width", "0%", "10%", 100.0)
            .style("softPop")
            .start(&driver, &style)
            .unwrap();
        // progress 1.5 is written as computed, not snapped to the target
        driver.run_frame(150.0);
        let last = Animatable::parse(&style.get("width")).unwrap();
        let expected = 10.0 * (1.5 * std::f64::consts::PI / 2.0).sin();
        assert!((last.number - expected).abs() < 1e-9);
        assert_eq!(last.suffix, "%");
    }

    #[test]
    fn test_peek_returns_to_start() {
        let driver = Rc::new(ManualFrameDriver::new());
        let style = Object::new();

        Tween::new("top", "10px", "30px", 100.0)
            .style("peek")
            .power(0.0)
            .start(&driver, &style)
            .unwrap();

        driver.run_frame(50.0);
        assert_eq!(style.get("top"), text("30px"));
        driver.run_frame(100.0);
        assert_eq!(style.get("top"), text("10px"));
    }

    #[test]
    fn test_zero_duration_completes_on_first_frame() {
        let driver = Rc::new(ManualFrameDriver::new());
        let style = Object::new();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();

        Tween::new("left", "0px", "8px", 0.0)
            .on_complete(move || flag.set(true))
            .start(&driver, &style)
            .unwrap();
        driver.run_frame(0.0);

        assert_eq!(style.get("left"), text("8px"));
        assert!(done.get());
    }

    #[test]
    fn test_dropped_driver_ends_tween() {
        let driver = Rc::new(ManualFrameDriver::new());
        let style = Object::new();
        animate(&driver, &style, "left", "0px", "8px", 100.0).unwrap();
        drop(driver);
        assert!(!style.has("left"));
    }
}
