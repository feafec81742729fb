use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Duration;
use gatehouse_core::clock::SharedClock;
use gatehouse_core::config::CaptchaConfig;
use rand::Rng;
use serde::Serialize;

use crate::auth::cache::ExpiringCache;

/// A captcha image handed to the client, identified by `captcha_id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaChallenge {
    pub captcha_id: String,
    /// `data:` URI of an SVG image.
    pub pic_path: String,
    pub captcha_length: usize,
}

/// ## Summary
/// Issues digit captchas and checks answers.
///
/// Answers are kept in memory for a limited time and can be checked once.
#[derive(Debug)]
pub struct CaptchaStore {
    answers: ExpiringCache<String, String>,
    length: usize,
    width: u32,
    height: u32,
    ttl: Duration,
}

impl CaptchaStore {
    #[must_use]
    pub fn new(config: &CaptchaConfig, clock: SharedClock) -> Self {
        Self {
            answers: ExpiringCache::new(clock),
            length: config.key_long.max(1),
            width: config.img_width.max(40),
            height: config.img_height.max(20),
            ttl: Duration::seconds(config.expire_secs),
        }
    }

    pub fn generate(&self) -> CaptchaChallenge {
        self.issue().0
    }

    /// Creates a challenge and returns it with its answer.
    pub(crate) fn issue(&self) -> (CaptchaChallenge, String) {
        let mut rng = rand::thread_rng();
        let answer: String = (0..self.length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        let captcha_id = uuid::Uuid::new_v4().simple().to_string();

        let svg = render_svg(&answer, self.width, self.height, &mut rng);
        let pic_path = format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg));

        self.answers
            .insert(captcha_id.clone(), answer.clone(), self.ttl);

        (
            CaptchaChallenge {
                captcha_id,
                pic_path,
                captcha_length: self.length,
            },
            answer,
        )
    }

    /// ## Summary
    /// Checks an answer. The challenge is consumed whether or not it matches.
    pub fn verify(&self, captcha_id: &str, answer: &str) -> bool {
        self.answers
            .remove(captcha_id)
            .is_some_and(|expected| expected == answer.trim())
    }

    /// Drops answers that were never checked before their deadline.
    pub fn purge_expired(&self) -> usize {
        self.answers.purge_expired()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.answers.len()
    }
}

/// Draws the digits with jittered position and rotation over a few noise lines.
fn render_svg(digits: &str, width: u32, height: u32, rng: &mut impl Rng) -> String {
    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><rect width="100%" height="100%" fill="#f4f4f4"/>"##
    );

    for _ in 0..4 {
        let (x1, y1) = (rng.gen_range(0..width), rng.gen_range(0..height));
        let (x2, y2) = (rng.gen_range(0..width), rng.gen_range(0..height));
        let shade = rng.gen_range(120..200u8);
        svg.push_str(&format!(
            r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="rgb({shade},{shade},{shade})" stroke-width="2"/>"#
        ));
    }

    let count = u32::try_from(digits.len()).unwrap_or(1).max(1);
    let step = width / (count + 1);
    let font_size = height * 3 / 5;
    for (index, digit) in (1..).zip(digits.chars()) {
        let x = step * index;
        let y = height * 2 / 3 + rng.gen_range(0..=height / 8);
        let angle = rng.gen_range(-25..=25i32);
        let shade = rng.gen_range(20..90u8);
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-family="monospace" font-size="{font_size}" fill="rgb({shade},{shade},{shade})" text-anchor="middle" transform="rotate({angle} {x} {y})">{digit}</text>"#
        ));
    }

    svg.push_str("</svg>");
    svg
}
