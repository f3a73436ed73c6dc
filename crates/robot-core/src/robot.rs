//! The desktop automation facade.

use std::time::Duration;

use tracing::{debug, info, warn};

use robot_platform::input::{ButtonAction, InputInjector, KeyAction, MouseButton};
use robot_platform::key::{Key, Modifiers};
use robot_platform::screen::ScreenCapture;
use robot_platform::{Color, Point, Rect, Result, RobotError, ScreenSize, Screenshot};

use crate::backend::{self, Backend};
use crate::config::RobotConfig;

/// Single entry point for pointer, keyboard and screen operations.
///
/// Every call blocks until the OS has accepted the event (or, for captures,
/// until the frame has been read). The cursor and keyboard driven here are
/// one global resource shared with every other process: `Robot` does no
/// locking, so callers sharing one instance across threads must wrap it in
/// a `Mutex`, and two instances in one process will interleave freely.
///
/// The only state held here is the configuration (delays, smooth-move
/// speed) and the backend handles.
pub struct Robot {
    input: Box<dyn InputInjector>,
    screen: Box<dyn ScreenCapture>,
    config: RobotConfig,
    display_name: Option<String>,
}

impl Robot {
    /// Connect to the platform backend with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(RobotConfig::default())
    }

    pub fn with_config(config: RobotConfig) -> Result<Self> {
        let backend = backend::create_backend(config.x_display_name.as_deref())?;
        Ok(Self::from_backend(backend, config))
    }

    /// Drive an already constructed backend.
    pub fn from_backend(backend: Backend, config: RobotConfig) -> Self {
        Self {
            input: backend.input,
            screen: backend.screen,
            config,
            display_name: backend.display_name,
        }
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    // --- Mouse ---

    pub fn get_mouse_pos(&self) -> Result<Point> {
        let (x, y) = self.input.mouse_location()?;
        Ok(Point::new(x, y))
    }

    /// Warp the cursor. Coordinates outside the display are clamped onto it.
    pub fn move_mouse(&mut self, x: i32, y: i32) -> Result<()> {
        let target = self.clamp_to_screen(x, y)?;
        self.input.mouse_move(target.x as u32, target.y as u32)?;
        debug!("mouse moved to ({}, {})", target.x, target.y);
        self.mouse_pause();
        Ok(())
    }

    /// Glide in a straight line to `(x, y)`, `speed` pixels per step.
    pub fn move_mouse_smooth(&mut self, x: i32, y: i32, speed: Option<f64>) -> Result<()> {
        let speed = speed
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or_else(|| self.config.effective_smooth_speed());
        let target = self.clamp_to_screen(x, y)?;
        let start = self.get_mouse_pos()?;

        let path = smooth_path(start, target, speed);
        debug!(
            "smooth move ({}, {}) -> ({}, {}) in {} steps",
            start.x,
            start.y,
            target.x,
            target.y,
            path.len()
        );
        for step in path {
            self.input.mouse_move(step.x as u32, step.y as u32)?;
            self.mouse_pause();
        }
        Ok(())
    }

    /// Press `button`, move to `(x, y)`, release.
    pub fn drag_mouse(&mut self, x: i32, y: i32, button: MouseButton) -> Result<()> {
        let target = self.clamp_to_screen(x, y)?;
        self.input.mouse_button(button, ButtonAction::Press)?;
        self.input.mouse_move(target.x as u32, target.y as u32)?;
        self.input.mouse_button(button, ButtonAction::Release)?;
        debug!("dragged {:?} to ({}, {})", button, target.x, target.y);
        self.mouse_pause();
        Ok(())
    }

    /// Click at the current cursor position.
    pub fn mouse_click(&mut self, button: MouseButton, double: bool) -> Result<()> {
        self.click_once(button)?;
        if double {
            sleep_ms(self.config.double_click_interval_ms);
            self.click_once(button)?;
        }
        debug!("clicked {:?} (double={})", button, double);
        self.mouse_pause();
        Ok(())
    }

    /// Press or release a button on its own.
    pub fn mouse_toggle(&mut self, action: ButtonAction, button: MouseButton) -> Result<()> {
        self.input.mouse_button(button, action)?;
        self.mouse_pause();
        Ok(())
    }

    /// Scroll by notches; positive `dy` scrolls down, positive `dx` right.
    pub fn scroll_mouse(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.input.mouse_scroll(dx, dy)?;
        self.mouse_pause();
        Ok(())
    }

    /// Negative delays are treated as zero.
    pub fn set_mouse_delay(&mut self, ms: i64) {
        self.config.mouse_delay_ms = non_negative_delay("mouse", ms);
    }

    pub fn mouse_delay(&self) -> Duration {
        Duration::from_millis(self.config.mouse_delay_ms)
    }

    // --- Keyboard ---

    /// Tap `key` with `modifiers` held. Names are validated before any
    /// event is sent.
    pub fn key_tap<S: AsRef<str>>(&mut self, key: &str, modifiers: &[S]) -> Result<()> {
        let key = Key::parse(key)?;
        let mods = Modifiers::from_names(modifiers)?;
        self.tap_key(key, mods)
    }

    /// Fails with [`RobotError::InvalidKey`] when the backend has no
    /// mapping for `key`, e.g. a character missing from the keyboard layout.
    pub fn tap_key(&mut self, key: Key, mods: Modifiers) -> Result<()> {
        self.send_key(key, KeyAction::Press, mods)?;
        self.send_key(key, KeyAction::Release, mods)?;
        debug!("tapped {:?} with {:?}", key, mods);
        self.keyboard_pause();
        Ok(())
    }

    /// Press or release `key`. Modifiers go down before a press and come
    /// up after a release.
    pub fn key_toggle<S: AsRef<str>>(
        &mut self,
        key: &str,
        action: KeyAction,
        modifiers: &[S],
    ) -> Result<()> {
        let key = Key::parse(key)?;
        let mods = Modifiers::from_names(modifiers)?;
        self.send_key(key, action, mods)?;
        self.keyboard_pause();
        Ok(())
    }

    /// Type one character, Unicode included where the backend supports it.
    pub fn unicode_tap(&mut self, ch: char) -> Result<()> {
        if !self.input.type_char(ch)? {
            return Err(RobotError::UntypableCharacters {
                skipped: vec![ch],
                typed: 0,
            });
        }
        self.keyboard_pause();
        Ok(())
    }

    /// Type `text` one character at a time, pausing the keyboard delay
    /// after each.
    ///
    /// Characters the backend cannot produce are skipped and the rest are
    /// still typed; the call then fails with
    /// [`RobotError::UntypableCharacters`].
    pub fn type_string(&mut self, text: &str) -> Result<()> {
        let delay = self.config.keyboard_delay_ms;
        self.type_chars(text, delay)
    }

    /// Type at `cpm` characters per minute. `0` uses the keyboard delay.
    pub fn type_string_delayed(&mut self, text: &str, cpm: u32) -> Result<()> {
        let delay = match cpm {
            0 => self.config.keyboard_delay_ms,
            cpm => 60_000 / cpm as u64,
        };
        self.type_chars(text, delay)
    }

    /// Negative delays are treated as zero.
    pub fn set_keyboard_delay(&mut self, ms: i64) {
        self.config.keyboard_delay_ms = non_negative_delay("keyboard", ms);
    }

    pub fn keyboard_delay(&self) -> Duration {
        Duration::from_millis(self.config.keyboard_delay_ms)
    }

    // --- Screen ---

    pub fn get_screen_size(&self) -> Result<ScreenSize> {
        let (width, height) = self.screen.dimensions()?;
        if width == 0 || height == 0 {
            return Err(RobotError::DisplayUnavailable(format!(
                "display reports a {width}x{height} screen"
            )));
        }
        Ok(ScreenSize::new(width, height))
    }

    /// Re-read display geometry, e.g. after a resolution change.
    pub fn update_screen_metrics(&self) -> Result<ScreenSize> {
        let size = self.get_screen_size()?;
        info!("screen metrics: {}x{}", size.width, size.height);
        Ok(size)
    }

    /// Sample one on-screen pixel at call time.
    pub fn get_pixel_color(&mut self, x: i32, y: i32) -> Result<Color> {
        let size = self.get_screen_size()?;
        if !size.contains(x as i64, y as i64) {
            return Err(RobotError::OutOfBounds {
                x: x as i64,
                y: y as i64,
                width: size.width,
                height: size.height,
            });
        }
        let shot = self.capture_rect(Rect::new(x, y, 1, 1))?;
        shot.color_at(0, 0)
    }

    /// Snapshot of the whole primary display.
    pub fn capture_screen(&mut self) -> Result<Screenshot> {
        self.capture_screen_area(None, None, None, None)
    }

    /// Snapshot of a region. Omitted values default to the screen origin
    /// and full screen size; the region is clipped to the display.
    pub fn capture_screen_area(
        &mut self,
        x: Option<i32>,
        y: Option<i32>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Screenshot> {
        let size = self.get_screen_size()?;
        let requested = Rect::new(
            x.unwrap_or(0),
            y.unwrap_or(0),
            width.unwrap_or(size.width),
            height.unwrap_or(size.height),
        );
        let region = requested
            .clip_to(size)
            .ok_or(RobotError::OutOfBounds {
                x: requested.x as i64,
                y: requested.y as i64,
                width: size.width,
                height: size.height,
            })?;
        if region != requested {
            debug!("capture region {:?} clipped to {:?}", requested, region);
        }
        self.capture_rect(region)
    }

    /// Color of a pixel inside an existing screenshot. No OS call.
    pub fn get_color(screenshot: &Screenshot, x: i32, y: i32) -> Result<Color> {
        screenshot.color_at(x as i64, y as i64)
    }

    // --- X11 display selection ---

    /// The X display the backend is connected to, if any.
    pub fn x_display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Reconnect both backends to another X display.
    pub fn set_x_display_name(&mut self, name: &str) -> Result<()> {
        if !backend::supports_x_display() {
            return Err(RobotError::unsupported("set_x_display_name"));
        }
        let backend = backend::create_backend(Some(name))?;
        self.input = backend.input;
        self.screen = backend.screen;
        self.display_name = backend.display_name;
        self.config.x_display_name = Some(name.to_string());
        info!("switched to X display {}", name);
        Ok(())
    }

    // --- helpers ---

    fn clamp_to_screen(&self, x: i32, y: i32) -> Result<Point> {
        let size = self.get_screen_size()?;
        let point = size.clamp(x, y);
        if point != Point::new(x, y) {
            debug!(
                "({}, {}) clamped to ({}, {}) on {}x{}",
                x, y, point.x, point.y, size.width, size.height
            );
        }
        Ok(point)
    }

    fn send_key(&mut self, key: Key, action: KeyAction, mods: Modifiers) -> Result<()> {
        if !self.input.key_event(key, action, mods)? {
            let name = match key {
                Key::Char(ch) => ch.to_string(),
                other => format!("{other:?}").to_lowercase(),
            };
            return Err(RobotError::InvalidKey(name));
        }
        Ok(())
    }

    fn click_once(&mut self, button: MouseButton) -> Result<()> {
        self.input.mouse_button(button, ButtonAction::Press)?;
        self.input.mouse_button(button, ButtonAction::Release)?;
        Ok(())
    }

    fn capture_rect(&mut self, region: Rect) -> Result<Screenshot> {
        let frame = self.screen.capture_region(region)?;
        if frame.width != region.width || frame.height != region.height {
            return Err(anyhow::anyhow!(
                "backend returned a {}x{} frame for a {}x{} region",
                frame.width,
                frame.height,
                region.width,
                region.height
            )
            .into());
        }
        Screenshot::from_frame(frame)
    }

    fn type_chars(&mut self, text: &str, delay_ms: u64) -> Result<()> {
        let mut typed = 0;
        let mut skipped = Vec::new();
        for ch in text.chars() {
            if self.input.type_char(ch)? {
                typed += 1;
            } else {
                warn!("cannot type {:?}, skipping", ch);
                skipped.push(ch);
            }
            sleep_ms(delay_ms);
        }
        debug!("typed {} characters", typed);

        if !skipped.is_empty() {
            return Err(RobotError::UntypableCharacters { skipped, typed });
        }
        Ok(())
    }

    fn mouse_pause(&self) {
        sleep_ms(self.config.mouse_delay_ms);
    }

    fn keyboard_pause(&self) {
        sleep_ms(self.config.keyboard_delay_ms);
    }
}

fn sleep_ms(ms: u64) {
    if ms > 0 {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

fn non_negative_delay(kind: &str, ms: i64) -> u64 {
    if ms < 0 {
        warn!("negative {} delay {}ms treated as 0", kind, ms);
        0
    } else {
        ms as u64
    }
}

/// Intermediate points of a straight-line glide, ending exactly on `to`.
///
/// The number of steps is `distance / speed`, at least one and never more
/// than one per pixel of distance.
pub fn smooth_path(from: Point, to: Point, speed: f64) -> Vec<Point> {
    let dx = to.x as i64 - from.x as i64;
    let dy = to.y as i64 - from.y as i64;
    let distance = ((dx * dx + dy * dy) as f64).sqrt();
    let max_steps = (distance.ceil() as i64).max(1);
    let steps = ((distance / speed) as i64).clamp(1, max_steps);

    (1..=steps)
        .map(|i| Point {
            x: (from.x as i64 + dx * i / steps) as i32,
            y: (from.y as i64 + dy * i / steps) as i32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_desktop::{expected_rgb, Event, VirtualDesktop};

    fn quiet_config() -> RobotConfig {
        RobotConfig {
            mouse_delay_ms: 0,
            keyboard_delay_ms: 0,
            double_click_interval_ms: 0,
            ..RobotConfig::default()
        }
    }

    fn robot(width: u32, height: u32) -> (Robot, VirtualDesktop) {
        let desktop = VirtualDesktop::new(width, height);
        let robot = Robot::from_backend(desktop.backend(), quiet_config());
        (robot, desktop)
    }

    fn is_hex_color(s: &str) -> bool {
        s.len() == 7 && s.starts_with('#') && s[1..].bytes().all(|b| b.is_ascii_hexdigit())
    }

    #[test]
    fn test_mouse_pos_is_idempotent() {
        let (robot, _) = robot(1920, 1080);
        assert_eq!(robot.get_mouse_pos().unwrap(), robot.get_mouse_pos().unwrap());
    }

    #[test]
    fn test_move_then_read() {
        let (mut robot, desktop) = robot(1920, 1080);
        robot.move_mouse(100, 100).unwrap();
        assert_eq!(robot.get_mouse_pos().unwrap(), Point::new(100, 100));
        assert_eq!(desktop.events(), vec![Event::Move(100, 100)]);

        for (x, y) in [(0, 0), (1919, 1079), (960, 3)] {
            robot.move_mouse(x, y).unwrap();
            assert_eq!(robot.get_mouse_pos().unwrap(), Point::new(x, y));
        }
    }

    #[test]
    fn test_move_clamps_out_of_range() {
        let (mut robot, _) = robot(800, 600);
        robot.move_mouse(-20, 5000).unwrap();
        assert_eq!(robot.get_mouse_pos().unwrap(), Point::new(0, 599));
        robot.move_mouse(i32::MAX, i32::MIN).unwrap();
        assert_eq!(robot.get_mouse_pos().unwrap(), Point::new(799, 0));
    }

    #[test]
    fn test_screen_size_positive() {
        let (robot, _) = robot(1920, 1080);
        let size = robot.get_screen_size().unwrap();
        assert_eq!(size, ScreenSize::new(1920, 1080));
        assert_eq!(robot.update_screen_metrics().unwrap(), size);
    }

    #[test]
    fn test_zero_sized_display_is_unavailable() {
        let (robot, _) = robot(0, 0);
        assert!(matches!(
            robot.get_screen_size(),
            Err(RobotError::DisplayUnavailable(_))
        ));
    }

    #[test]
    fn test_set_delays() {
        let (mut robot, _) = robot(100, 100);
        robot.set_mouse_delay(20);
        assert_eq!(robot.mouse_delay(), Duration::from_millis(20));
        robot.set_keyboard_delay(20);
        assert_eq!(robot.keyboard_delay(), Duration::from_millis(20));

        robot.set_mouse_delay(-5);
        assert_eq!(robot.mouse_delay(), Duration::ZERO);
        robot.set_keyboard_delay(-1);
        assert_eq!(robot.keyboard_delay(), Duration::ZERO);
    }

    #[test]
    fn test_type_string_in_order() {
        let (mut robot, desktop) = robot(100, 100);
        robot.type_string("Hello, RobotJS!").unwrap();
        assert_eq!(desktop.typed_text(), "Hello, RobotJS!");
        assert_eq!(desktop.events().len(), 15);
    }

    #[test]
    fn test_type_string_signals_skipped_characters() {
        let (mut robot, desktop) = robot(100, 100);
        let err = robot.type_string("caf\u{e9} ok").unwrap_err();
        match err {
            RobotError::UntypableCharacters { skipped, typed } => {
                assert_eq!(skipped, vec!['\u{e9}']);
                assert_eq!(typed, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The remaining characters were still typed
        assert_eq!(desktop.typed_text(), "caf ok");
    }

    #[test]
    fn test_type_string_delayed() {
        let (mut robot, desktop) = robot(100, 100);
        robot.type_string_delayed("ab", 60_000).unwrap();
        robot.type_string_delayed("c", 0).unwrap();
        assert_eq!(desktop.typed_text(), "abc");
    }

    #[test]
    fn test_unicode_tap() {
        let (mut robot, desktop) = robot(100, 100);
        robot.unicode_tap('x').unwrap();
        assert_eq!(desktop.typed_text(), "x");
        assert!(matches!(
            robot.unicode_tap('\u{2603}'),
            Err(RobotError::UntypableCharacters { typed: 0, .. })
        ));
    }

    #[test]
    fn test_mouse_click_defaults() {
        let (mut robot, desktop) = robot(100, 100);
        robot.mouse_click(MouseButton::default(), false).unwrap();
        assert_eq!(
            desktop.events(),
            vec![
                Event::Button(MouseButton::Left, ButtonAction::Press),
                Event::Button(MouseButton::Left, ButtonAction::Release),
            ]
        );
    }

    #[test]
    fn test_double_click() {
        let (mut robot, desktop) = robot(100, 100);
        robot.mouse_click(MouseButton::Right, true).unwrap();
        let events = desktop.events();
        assert_eq!(events.len(), 4);
        assert!(events
            .iter()
            .all(|e| matches!(e, Event::Button(MouseButton::Right, _))));
    }

    #[test]
    fn test_mouse_toggle_and_scroll() {
        let (mut robot, desktop) = robot(100, 100);
        robot
            .mouse_toggle(ButtonAction::Press, MouseButton::Middle)
            .unwrap();
        robot.scroll_mouse(0, -3).unwrap();
        assert_eq!(
            desktop.events(),
            vec![
                Event::Button(MouseButton::Middle, ButtonAction::Press),
                Event::Scroll(0, -3),
            ]
        );
    }

    #[test]
    fn test_drag_mouse() {
        let (mut robot, desktop) = robot(640, 480);
        robot.drag_mouse(700, 10, MouseButton::Left).unwrap();
        assert_eq!(
            desktop.events(),
            vec![
                Event::Button(MouseButton::Left, ButtonAction::Press),
                Event::Move(639, 10),
                Event::Button(MouseButton::Left, ButtonAction::Release),
            ]
        );
    }

    #[test]
    fn test_move_mouse_smooth_ends_on_target() {
        let (mut robot, desktop) = robot(1000, 1000);
        robot.move_mouse(0, 0).unwrap();
        robot.move_mouse_smooth(30, 40, Some(5.0)).unwrap();

        let moves: Vec<_> = desktop
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Move(x, y) => Some((x, y)),
                _ => None,
            })
            .collect();
        // initial warp + 50px / 5px per step
        assert_eq!(moves.len(), 1 + 10);
        assert_eq!(*moves.last().unwrap(), (30, 40));
        assert_eq!(robot.get_mouse_pos().unwrap(), Point::new(30, 40));
    }

    #[test]
    fn test_smooth_path_shape() {
        let path = smooth_path(Point::new(0, 0), Point::new(9, 0), 3.0);
        assert_eq!(
            path,
            vec![Point::new(3, 0), Point::new(6, 0), Point::new(9, 0)]
        );

        let same = smooth_path(Point::new(5, 5), Point::new(5, 5), 3.0);
        assert_eq!(same, vec![Point::new(5, 5)]);

        let back = smooth_path(Point::new(10, 10), Point::new(0, 0), 100.0);
        assert_eq!(back, vec![Point::new(0, 0)]);
    }

    #[test]
    fn test_smooth_path_caps_steps_at_distance() {
        let path = smooth_path(Point::new(0, 0), Point::new(1000, 0), 1e-12);
        assert_eq!(path.len(), 1000);
        assert_eq!(path.last(), Some(&Point::new(1000, 0)));

        let diagonal = smooth_path(Point::new(0, 0), Point::new(3, 4), f64::MIN_POSITIVE);
        assert_eq!(diagonal.len(), 5);
        assert_eq!(diagonal.last(), Some(&Point::new(3, 4)));
    }

    #[test]
    fn test_move_mouse_smooth_tiny_speed() {
        let (mut robot, desktop) = robot(1920, 1080);
        robot.move_mouse_smooth(1000, 0, Some(1e-12)).unwrap();

        let events = desktop.events();
        assert!(events.len() <= 1000);
        assert_eq!(events.last(), Some(&Event::Move(1000, 0)));
        assert_eq!(robot.get_mouse_pos().unwrap(), Point::new(1000, 0));
    }

    #[test]
    fn test_key_tap_with_modifiers() {
        let (mut robot, desktop) = robot(100, 100);
        robot.key_tap("a", &["control", "shift"]).unwrap();

        let mods = Modifiers {
            shift: true,
            ctrl: true,
            ..Modifiers::default()
        };
        assert_eq!(
            desktop.events(),
            vec![
                Event::Key(Key::Char('a'), KeyAction::Press, mods),
                Event::Key(Key::Char('a'), KeyAction::Release, mods),
            ]
        );
    }

    #[test]
    fn test_key_tap_without_modifiers() {
        let (mut robot, desktop) = robot(100, 100);
        let none: [&str; 0] = [];
        robot.key_tap("enter", &none).unwrap();
        assert_eq!(desktop.events().len(), 2);
    }

    #[test]
    fn test_key_tap_invalid_key_sends_nothing() {
        let (mut robot, desktop) = robot(100, 100);
        assert!(matches!(
            robot.key_tap("notakey", &["shift"]),
            Err(RobotError::InvalidKey(name)) if name == "notakey"
        ));
        assert!(matches!(
            robot.key_tap("a", &["banana"]),
            Err(RobotError::InvalidKey(name)) if name == "banana"
        ));
        assert!(desktop.events().is_empty());
    }

    #[test]
    fn test_unmapped_character_key_is_invalid() {
        let (mut robot, desktop) = robot(100, 100);
        assert!(matches!(
            robot.key_tap("\u{e9}", &["shift"]),
            Err(RobotError::InvalidKey(name)) if name == "\u{e9}"
        ));
        assert!(matches!(
            robot.key_toggle("\u{e9}", KeyAction::Press, &[] as &[&str]),
            Err(RobotError::InvalidKey(_))
        ));
        assert!(desktop.events().is_empty());
    }

    #[test]
    fn test_key_toggle() {
        let (mut robot, desktop) = robot(100, 100);
        robot.key_toggle("shift", KeyAction::Press, &[] as &[&str]).unwrap();
        robot.key_toggle("shift", KeyAction::Release, &[] as &[&str]).unwrap();
        assert_eq!(
            desktop.events(),
            vec![
                Event::Key(Key::Shift, KeyAction::Press, Modifiers::NONE),
                Event::Key(Key::Shift, KeyAction::Release, Modifiers::NONE),
            ]
        );
    }

    #[test]
    fn test_capture_screen_full_hd_shape() {
        let (mut robot, _) = robot(1920, 1080);
        let shot = robot.capture_screen().unwrap();
        assert_eq!(shot.width(), 1920);
        assert_eq!(shot.height(), 1080);
        assert_eq!(shot.image().len(), 1920 * 1080 * 4);
        assert_eq!(
            shot.image().len(),
            (shot.width() * shot.height() * shot.bytes_per_pixel()) as usize
        );
    }

    #[test]
    fn test_capture_area_clips_to_screen() {
        let (mut robot, desktop) = robot(200, 100);
        let shot = robot
            .capture_screen_area(Some(150), Some(50), Some(100), None)
            .unwrap();
        assert_eq!((shot.width(), shot.height()), (50, 50));
        assert_eq!(desktop.state().captures, vec![Rect::new(150, 50, 50, 50)]);

        let (r, g, b) = expected_rgb(150, 50);
        assert_eq!(Robot::get_color(&shot, 0, 0).unwrap(), Color::new(r, g, b));
    }

    #[test]
    fn test_capture_area_off_screen_is_out_of_bounds() {
        let (mut robot, desktop) = robot(200, 100);
        assert!(matches!(
            robot.capture_screen_area(Some(300), Some(0), Some(10), Some(10)),
            Err(RobotError::OutOfBounds { x: 300, .. })
        ));
        assert!(desktop.state().captures.is_empty());
    }

    #[test]
    fn test_torn_capture_is_rejected() {
        let (mut robot, desktop) = robot(64, 64);
        desktop.state().tear_frames = true;
        assert!(matches!(
            robot.capture_screen(),
            Err(RobotError::InvalidBuffer { .. })
        ));
    }

    #[test]
    fn test_pixel_color_matches_screen() {
        let (mut robot, desktop) = robot(300, 300);
        let color = robot.get_pixel_color(12, 34).unwrap();
        let (r, g, b) = expected_rgb(12, 34);
        assert_eq!(color, Color::new(r, g, b));
        assert!(is_hex_color(&color.to_string()));
        assert_eq!(desktop.state().captures, vec![Rect::new(12, 34, 1, 1)]);
    }

    #[test]
    fn test_pixel_color_out_of_bounds() {
        let (mut robot, _) = robot(300, 300);
        for (x, y) in [(300, 0), (0, 300), (-1, 5)] {
            assert!(matches!(
                robot.get_pixel_color(x, y),
                Err(RobotError::OutOfBounds { .. })
            ));
        }
    }

    #[test]
    fn test_get_color_bounds_and_format() {
        let (mut robot, _) = robot(40, 30);
        let shot = robot.capture_screen().unwrap();

        let color = Robot::get_color(&shot, 0, 0).unwrap();
        assert!(is_hex_color(&color.to_string()));

        assert!(matches!(
            Robot::get_color(&shot, shot.width() as i32, 0),
            Err(RobotError::OutOfBounds { .. })
        ));
        assert!(matches!(
            Robot::get_color(&shot, 0, -1),
            Err(RobotError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_screenshot_is_a_snapshot() {
        let (mut robot, desktop) = robot(16, 16);
        let shot = robot.capture_screen().unwrap();
        let before = Robot::get_color(&shot, 3, 3).unwrap();

        desktop.state().width = 8;
        desktop.state().height = 8;
        let later = robot.capture_screen().unwrap();

        assert_eq!(shot.width(), 16);
        assert_eq!(later.width(), 8);
        assert_eq!(Robot::get_color(&shot, 3, 3).unwrap(), before);
    }

    #[test]
    fn test_x_display_name_without_x11() {
        let (mut robot, _) = robot(100, 100);
        assert_eq!(robot.x_display_name(), None);
        if !backend::supports_x_display() {
            assert!(matches!(
                robot.set_x_display_name(":0"),
                Err(RobotError::UnsupportedPlatform { .. })
            ));
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_set_unreachable_x_display_keeps_backend() {
        let (mut robot, desktop) = robot(100, 100);
        assert!(matches!(
            robot.set_x_display_name(":4242"),
            Err(RobotError::DisplayUnavailable(_))
        ));
        // Still driving the original backend
        robot.move_mouse(5, 5).unwrap();
        assert_eq!(desktop.events(), vec![Event::Move(5, 5)]);
    }

    #[test]
    fn test_robot_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Robot>();
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Screenshot>();
    }
}
