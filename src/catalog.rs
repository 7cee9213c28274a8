use crate::random::ColorShift;

pub const NO_FILTER: &str = "No filter";
pub const RANDOM_FILTER: &str = "Random filter";

#[derive(Debug, Clone, Copy)]
pub enum EffectTemplate {
    /// Contributes nothing to the chain.
    Identity,
    Fixed(&'static str),
    /// Filled in with freshly drawn parameters on every chain build.
    Parametrized(fn(&ColorShift) -> String),
    /// Stands for another catalog entry picked at random.
    RandomPick,
}

#[derive(Debug, Clone, Copy)]
pub struct Effect {
    pub name: &'static str,
    pub template: EffectTemplate,
}

impl Effect {
    pub fn is_parametrized(&self) -> bool {
        matches!(self.template, EffectTemplate::Parametrized(_))
    }

    /// Filter text with parameters substituted. Empty for the identity and
    /// the random-pick sentinel, which must be resolved before rendering.
    pub fn render(&self, params: &ColorShift) -> String {
        match self.template {
            EffectTemplate::Identity | EffectTemplate::RandomPick => String::new(),
            EffectTemplate::Fixed(expr) => expr.to_string(),
            EffectTemplate::Parametrized(fill) => fill(params),
        }
    }
}

fn color_shift_expr(br: &str, ct: &str, sat: &str, hue: &str) -> String {
    format!("eq=brightness={br}:contrast={ct}:saturation={sat},hue=h={hue}")
}

fn color_shift(p: &ColorShift) -> String {
    color_shift_expr(
        &format!("{:.2}", p.brightness),
        &format!("{:.2}", p.contrast),
        &format!("{:.2}", p.saturation),
        &format!("{:.2}", p.hue),
    )
}

const fn fixed(name: &'static str, expr: &'static str) -> Effect {
    Effect {
        name,
        template: EffectTemplate::Fixed(expr),
    }
}

static CATALOG: &[Effect] = &[
    Effect {
        name: NO_FILTER,
        template: EffectTemplate::Identity,
    },
    Effect {
        name: "Random color shift",
        template: EffectTemplate::Parametrized(color_shift),
    },
    fixed("Black and white", "hue=s=0"),
    fixed("High contrast", "eq=contrast=2.0"),
    fixed("Low contrast", "eq=contrast=0.5"),
    fixed(
        "Sepia",
        "colorchannelmixer=.393:.769:.189:0:.349:.686:.168:0:.272:.534:.131",
    ),
    fixed("Inversion", "negate"),
    fixed("Blur (light)", "gblur=sigma=2"),
    fixed("Blur (strong)", "gblur=sigma=10"),
    fixed("Flip horizontally", "hflip"),
    fixed("Flip vertically", "vflip"),
    fixed(
        "Pixelation",
        "scale=iw/10:ih/10,scale=iw*10:ih*10:flags=neighbor",
    ),
    fixed("VHS", "chromashift=1:1,noise=alls=20:allf=t+u"),
    fixed("Blue Tones", "colorbalance=bs=1"),
    fixed("Red Tones", "colorbalance=rs=1"),
    fixed("Increased Brightness", "eq=brightness=0.2"),
    fixed("Decreased Brightness", "eq=brightness=-0.2"),
    fixed("Increased Saturation", "eq=saturation=2.0"),
    fixed("Decreased Saturation", "eq=saturation=0.5"),
    fixed("Green Tones", "colorbalance=gs=1"),
    fixed("Posterization", "pp=al"),
    fixed(
        "Strong Sepia",
        "colorchannelmixer=.593:.869:.189:0:.649:.786:.268:0:.472:.734:.331",
    ),
    fixed("Strong Red Tones", "colorbalance=rs=1"),
    fixed("Strong Green Tones", "colorbalance=gs=1"),
    fixed("Strong Blue Tones", "colorbalance=bs=1"),
    fixed(
        "Warm Filter",
        "curves=r='0/0 0.4/0.5 1/1':g='0/0 0.6/0.6 1/1'",
    ),
    fixed(
        "Cool Filter",
        "curves=b='0/0 0.4/0.5 1/1':g='0/0 0.4/0.4 1/1'",
    ),
    fixed("Bright and Saturated", "eq=brightness=0.3:saturation=2.0"),
    fixed("Grayish Tones", "eq=saturation=0.7:contrast=1.3"),
    fixed("Blue-Red", "colorchannelmixer=1:0:0:0:0:0:1:0:0:0:0:1"),
    fixed("Purple Tint", "colorbalance=rs=1.2:bs=1.2"),
    Effect {
        name: RANDOM_FILTER,
        template: EffectTemplate::RandomPick,
    },
];

pub fn all() -> &'static [Effect] {
    CATALOG
}

pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|e| e.name)
}

pub fn lookup(name: &str) -> Option<&'static Effect> {
    CATALOG.iter().find(|e| e.name == name)
}

/// Raw template text for `name`, placeholders left in; empty for unknown names.
pub fn template(name: &str) -> String {
    match lookup(name).map(|e| e.template) {
        Some(EffectTemplate::Fixed(expr)) => expr.to_string(),
        Some(EffectTemplate::Parametrized(_)) => {
            color_shift_expr("{br}", "{ct}", "{sat}", "{hue}")
        }
        _ => String::new(),
    }
}
