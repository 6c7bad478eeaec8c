use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub success: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "Fox",
    bg: Color::Rgb(24, 20, 18),
    fg: Color::Rgb(236, 226, 214),
    accent: Color::Rgb(242, 128, 48),
    muted: Color::Rgb(140, 128, 118),
    border: Color::Rgb(72, 62, 56),
    highlight_fg: Color::Rgb(24, 20, 18),
    highlight_bg: Color::Rgb(242, 128, 48),
    stripe_bg: Color::Rgb(32, 27, 24),
    status: Color::Rgb(250, 200, 90),
    success: Color::Rgb(130, 200, 120),
    error: Color::Rgb(235, 90, 80),
    key_fg: Color::Rgb(24, 20, 18),
    key_bg: Color::Rgb(180, 160, 140),
  },
  Theme {
    name: "Midnight",
    bg: Color::Rgb(16, 18, 28),
    fg: Color::Rgb(214, 220, 240),
    accent: Color::Rgb(122, 162, 247),
    muted: Color::Rgb(110, 118, 150),
    border: Color::Rgb(52, 58, 84),
    highlight_fg: Color::Rgb(16, 18, 28),
    highlight_bg: Color::Rgb(122, 162, 247),
    stripe_bg: Color::Rgb(22, 25, 38),
    status: Color::Rgb(224, 175, 104),
    success: Color::Rgb(158, 206, 106),
    error: Color::Rgb(247, 118, 142),
    key_fg: Color::Rgb(16, 18, 28),
    key_bg: Color::Rgb(150, 160, 200),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(250, 247, 240),
    fg: Color::Rgb(40, 40, 40),
    accent: Color::Rgb(200, 90, 20),
    muted: Color::Rgb(130, 125, 118),
    border: Color::Rgb(210, 202, 190),
    highlight_fg: Color::Rgb(250, 247, 240),
    highlight_bg: Color::Rgb(200, 90, 20),
    stripe_bg: Color::Rgb(242, 238, 228),
    status: Color::Rgb(170, 120, 0),
    success: Color::Rgb(40, 140, 60),
    error: Color::Rgb(190, 40, 40),
    key_fg: Color::Rgb(250, 247, 240),
    key_bg: Color::Rgb(110, 104, 96),
  },
];
