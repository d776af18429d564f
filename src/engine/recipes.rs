//! Recipe table - complex update rules selected by numeric id
//!
//! Each recipe maps the current iterate `z`, the effective constant `c`
//! and (for memory recipes) the previous iterate to the next iterate.
//! The table is built once; unknown ids resolve to Mandelbrot so newer
//! callers can send ids this build does not know yet.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::numeric::{
    guarded_div, inverse_polar_power, norm_sqr, polar_power, reciprocal, square, DIV_EPSILON,
};
use super::ComplexPoint;

/// Weight of the previous iterate in the Phoenix recipes.
const PHOENIX_LAMBDA: f64 = -0.5;

/// Base rotation of the Spiral recipe; the layer gamma adds `2·gamma`.
const SPIRAL_BASE_ANGLE: f64 = 0.35;

/// Needle of the Burning Ship antenna, zoomed by recipe 21.
const NEEDLE_CENTER: (f64, f64) = (-1.762, -0.028);
const NEEDLE_SHRINK: f64 = 0.05;

/// Deeper zoom into the same antenna, used by recipe 47.
const DEEP_NEEDLE_CENTER: (f64, f64) = (-1.7681, -0.0018);
const DEEP_NEEDLE_SHRINK: f64 = 0.002;

/// How the constant is scaled by `s = 1 + iteration·(gamma - 1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    None,
    Multiply,
    Divide,
}

impl TryFrom<u8> for ScaleMode {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ScaleMode::None),
            1 => Ok(ScaleMode::Multiply),
            2 => Ok(ScaleMode::Divide),
            other => Err(other),
        }
    }
}

/// Initial iterate before step 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seed {
    /// z0 = (0, 0)
    Origin,
    /// z0 = (1, 0), a root of the Nova polynomials
    UnitReal,
    /// z0 = c, the sampled constant
    Constant,
}

impl Seed {
    /// Seed rule keyed on the recipe id
    pub fn for_recipe_id(id: u32) -> Self {
        match id {
            26 | 40 | 42..=46 => Seed::UnitReal,
            30..=39 => Seed::Constant,
            _ => Seed::Origin,
        }
    }

    pub fn initial(self, c: ComplexPoint) -> ComplexPoint {
        match self {
            Seed::Origin => ComplexPoint::new(0.0, 0.0),
            Seed::UnitReal => ComplexPoint::new(1.0, 0.0),
            Seed::Constant => c,
        }
    }
}

/// One complex dynamical update rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recipe {
    Mandelbrot,
    Tricorn,
    BurningShip,
    PerpendicularMandelbrot,
    Celtic,
    Buffalo,
    Phoenix,
    Multibrot(u32),
    Cosine,
    Sine,
    Heart,
    PerpendicularBuffalo,
    Spiral,
    Tangent,
    Exponential,
    InverseMandelbrot,
    /// Burning Ship sampled around a fixed needle: c' = center + c·shrink
    NeedleBurningShip { center: ComplexPoint, shrink: f64 },
    PowerBurningShip(u32),
    Nova,
    ManOWar,
    InversePower(u32),
    InverseBurningShip,
    InverseTricorn,
    InverseCeltic,
    InversePhoenix,
    TriNova,
    NovaMandelbrot,
    Nova2,
    Nova2Alt,
    QuarticNova,
    FlowerNova,
    ScatterNova,
}

impl Recipe {
    /// Newton/Nova recipes terminate on iterate settling rather than escape.
    pub fn is_convergent(&self) -> bool {
        matches!(
            self,
            Recipe::Nova
                | Recipe::TriNova
                | Recipe::NovaMandelbrot
                | Recipe::Nova2
                | Recipe::Nova2Alt
                | Recipe::QuarticNova
                | Recipe::FlowerNova
                | Recipe::ScatterNova
        )
    }

    /// The iterate a step actually starts from. Flower and Scatter Nova
    /// replace `z` with `c` on the first step; everything else uses `z`.
    pub fn step_origin(&self, z: ComplexPoint, c: ComplexPoint, iteration: u32) -> ComplexPoint {
        match self {
            Recipe::FlowerNova | Recipe::ScatterNova => reseed(z, c, iteration),
            _ => z,
        }
    }

    /// Apply one update. `c` must already be the effective constant.
    ///
    /// Returns `(z_next, z_prev_next)`; every recipe shifts the current
    /// iterate into the memory slot, only the Phoenix-like ones read it.
    pub fn step(
        &self,
        z: ComplexPoint,
        z_prev: ComplexPoint,
        c: ComplexPoint,
        gamma: f64,
        iteration: u32,
    ) -> (ComplexPoint, ComplexPoint) {
        let (x, y) = (z.re, z.im);
        let (a, b) = (x.abs(), y.abs());

        let next = match *self {
            Recipe::Mandelbrot => square(z) + c,
            Recipe::Tricorn => ComplexPoint::new(x * x - y * y + c.re, -2.0 * x * y + c.im),
            Recipe::BurningShip => burning_ship(a, b, c),
            Recipe::PerpendicularMandelbrot => {
                ComplexPoint::new(x * x - y * y + c.re, -2.0 * a * y + c.im)
            }
            Recipe::Celtic => ComplexPoint::new((x * x - y * y).abs() + c.re, 2.0 * x * y + c.im),
            Recipe::Buffalo => ComplexPoint::new((x * x - y * y).abs() + c.re, -2.0 * x * y + c.im),
            Recipe::Phoenix => square(z) + c + z_prev * PHOENIX_LAMBDA,
            Recipe::Multibrot(p) => polar_power(z, p) + c,
            Recipe::Cosine => {
                ComplexPoint::new(x.cos() * y.cosh() + c.re, -x.sin() * y.sinh() + c.im)
            }
            Recipe::Sine => ComplexPoint::new(x.sin() * y.cosh() + c.re, x.cos() * y.sinh() + c.im),
            Recipe::Heart => ComplexPoint::new(a * a - y * y + c.re, 2.0 * a * y + c.im),
            Recipe::PerpendicularBuffalo => {
                ComplexPoint::new((x * x - y * y).abs() + c.re, -2.0 * a * y + c.im)
            }
            Recipe::Spiral => {
                let theta = SPIRAL_BASE_ANGLE + 2.0 * gamma;
                square(z) * ComplexPoint::new(theta.cos(), theta.sin()) + c
            }
            Recipe::Tangent => {
                let d = (2.0 * x).cos() + (2.0 * y).cosh() + DIV_EPSILON;
                ComplexPoint::new((2.0 * x).sin() / d + c.re, (2.0 * y).sinh() / d + c.im)
            }
            Recipe::Exponential => {
                let e = x.exp();
                ComplexPoint::new(e * y.cos() + c.re, e * y.sin() + c.im)
            }
            // Imaginary part keeps the positive sign of z²: z²/|z|⁴, not conj.
            Recipe::InverseMandelbrot => over_r4(square(z), z) + c,
            Recipe::NeedleBurningShip { center, shrink } => burning_ship(a, b, center + c * shrink),
            Recipe::PowerBurningShip(p) => polar_power(ComplexPoint::new(a, b), p) + c,
            Recipe::Nova | Recipe::NovaMandelbrot => newton_cubic(z) + c,
            Recipe::ManOWar => square(z) + c + z_prev,
            Recipe::InversePower(p) => inverse_polar_power(z, p) + c,
            Recipe::InverseBurningShip => {
                over_r4(ComplexPoint::new(a * a - b * b, 2.0 * a * b), z) + c
            }
            Recipe::InverseTricorn => over_r4(square(z).conj(), z) + c,
            Recipe::InverseCeltic => {
                over_r4(ComplexPoint::new((x * x - y * y).abs(), 2.0 * x * y), z) + c
            }
            Recipe::InversePhoenix => over_r4(square(z), z) + c + z_prev * PHOENIX_LAMBDA,
            Recipe::TriNova => tri_nova(z, c),
            Recipe::Nova2 => reciprocal(tri_nova(reciprocal(z), c)),
            Recipe::Nova2Alt => reciprocal(tri_nova(z, c)),
            Recipe::QuarticNova => newton_quartic(z) + c,
            Recipe::FlowerNova => -(newton_quartic(reseed(z, c, iteration)) + c),
            Recipe::ScatterNova => reciprocal(newton_quartic(reseed(z, c, iteration)) + c),
        };

        (next, z)
    }
}

fn burning_ship(a: f64, b: f64, c: ComplexPoint) -> ComplexPoint {
    ComplexPoint::new(a * a - b * b + c.re, 2.0 * a * b + c.im)
}

/// w / (|z|⁴ + ε), the shared shape of the reciprocal-square recipes
fn over_r4(w: ComplexPoint, z: ComplexPoint) -> ComplexPoint {
    let r2 = norm_sqr(z);
    let r4 = r2 * r2 + DIV_EPSILON;
    ComplexPoint::new(w.re / r4, w.im / r4)
}

/// Newton update for z³ - 1 without the constant
fn newton_cubic(z: ComplexPoint) -> ComplexPoint {
    let z2 = z * z;
    let num = z2 * z - 1.0;
    z - guarded_div(num, z2 * 3.0)
}

/// Newton update for z⁴ - 1 without the constant
fn newton_quartic(z: ComplexPoint) -> ComplexPoint {
    let z3 = z * z * z;
    let num = z3 * z - 1.0;
    z - guarded_div(num, z3 * 4.0)
}

/// (4/3)z - (1/3)z⁴ + c
fn tri_nova(z: ComplexPoint, c: ComplexPoint) -> ComplexPoint {
    let z4 = square(square(z));
    z * (4.0 / 3.0) - z4 * (1.0 / 3.0) + c
}

/// Flower/Scatter restart from the constant on the first step, whatever
/// the seed table produced.
fn reseed(z: ComplexPoint, c: ComplexPoint, iteration: u32) -> ComplexPoint {
    if iteration == 0 {
        c
    } else {
        z
    }
}

/// Constant actually fed to a recipe on a given step
pub fn effective_constant(
    c: ComplexPoint,
    gamma: f64,
    iteration: u32,
    scale_mode: ScaleMode,
) -> ComplexPoint {
    let s = 1.0 + iteration as f64 * (gamma - 1.0);
    match scale_mode {
        ScaleMode::None => c,
        ScaleMode::Multiply => ComplexPoint::new(c.re * s, c.im * s),
        ScaleMode::Divide => ComplexPoint::new(c.re / s, c.im / s),
    }
}

/// Dispatch one step by recipe id. Unknown ids behave as Mandelbrot.
pub fn step(
    recipe_id: u32,
    z: ComplexPoint,
    z_prev: ComplexPoint,
    c: ComplexPoint,
    gamma: f64,
    iteration: u32,
    scale_mode: ScaleMode,
) -> (ComplexPoint, ComplexPoint) {
    let cc = effective_constant(c, gamma, iteration, scale_mode);
    RecipeTable::global()
        .lookup(recipe_id)
        .recipe
        .step(z, z_prev, cc, gamma, iteration)
}

/// Table row: id, display name, update rule and seed rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipeEntry {
    pub id: u32,
    pub name: &'static str,
    pub recipe: Recipe,
    pub seed: Seed,
}

/// Static id -> recipe mapping, sorted by id
#[derive(Debug)]
pub struct RecipeTable {
    entries: Vec<RecipeEntry>,
}

impl RecipeTable {
    /// Process-wide table, built on first use
    pub fn global() -> &'static RecipeTable {
        static TABLE: OnceLock<RecipeTable> = OnceLock::new();
        TABLE.get_or_init(RecipeTable::build)
    }

    fn build() -> Self {
        use Recipe::*;

        let needle = NeedleBurningShip {
            center: ComplexPoint::new(NEEDLE_CENTER.0, NEEDLE_CENTER.1),
            shrink: NEEDLE_SHRINK,
        };
        let deep_needle = NeedleBurningShip {
            center: ComplexPoint::new(DEEP_NEEDLE_CENTER.0, DEEP_NEEDLE_CENTER.1),
            shrink: DEEP_NEEDLE_SHRINK,
        };

        let rows: [(u32, &'static str, Recipe); 46] = [
            (0, "Mandelbrot", Mandelbrot),
            (1, "Tricorn", Tricorn),
            (2, "Burning Ship", BurningShip),
            (3, "Perpendicular Mandelbrot", PerpendicularMandelbrot),
            (4, "Celtic", Celtic),
            (5, "Buffalo", Buffalo),
            (6, "Phoenix", Phoenix),
            (7, "Multibrot 3", Multibrot(3)),
            (8, "Multibrot 4", Multibrot(4)),
            (9, "Cosine", Cosine),
            (10, "Sine", Sine),
            (11, "Heart", Heart),
            (12, "Perpendicular Buffalo", PerpendicularBuffalo),
            (13, "Spiral", Spiral),
            (14, "Multibrot 5", Multibrot(5)),
            (15, "Multibrot 6", Multibrot(6)),
            (16, "Tangent", Tangent),
            (17, "Exponential", Exponential),
            (18, "Multibrot 7", Multibrot(7)),
            (19, "Multibrot 8", Multibrot(8)),
            (20, "Inverse Mandelbrot", InverseMandelbrot),
            (21, "Burning Ship Needle", needle),
            (22, "Burning Ship 3", PowerBurningShip(3)),
            (23, "Burning Ship 4", PowerBurningShip(4)),
            (24, "Burning Ship 5", PowerBurningShip(5)),
            (25, "Burning Ship 6", PowerBurningShip(6)),
            (26, "Nova", Nova),
            (27, "Man-o-War", ManOWar),
            (30, "Inverse Power 3", InversePower(3)),
            (31, "Inverse Power 4", InversePower(4)),
            (32, "Inverse Power 5", InversePower(5)),
            (33, "Inverse Power 6", InversePower(6)),
            (34, "Inverse Power 7", InversePower(7)),
            (35, "Inverse Power 8", InversePower(8)),
            (36, "Inverse Burning Ship", InverseBurningShip),
            (37, "Inverse Tricorn", InverseTricorn),
            (38, "Inverse Celtic", InverseCeltic),
            (39, "Inverse Phoenix", InversePhoenix),
            (40, "Tri-Nova", TriNova),
            (41, "Nova-Mandelbrot", NovaMandelbrot),
            (42, "Nova-2", Nova2),
            (43, "Nova-2 Alt", Nova2Alt),
            (44, "Quartic Nova", QuarticNova),
            (45, "Flower Nova", FlowerNova),
            (46, "Scatter Nova", ScatterNova),
            (47, "Burning Ship Deep Needle", deep_needle),
        ];

        let entries = rows
            .into_iter()
            .map(|(id, name, recipe)| RecipeEntry {
                id,
                name,
                recipe,
                seed: Seed::for_recipe_id(id),
            })
            .collect();

        Self { entries }
    }

    /// Exact lookup, `None` for ids outside the table
    pub fn get(&self, id: u32) -> Option<&RecipeEntry> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Lookup with the Mandelbrot fallback
    pub fn lookup(&self, id: u32) -> &RecipeEntry {
        match self.get(id) {
            Some(entry) => entry,
            None => {
                tracing::trace!("Recipe id {} unknown, using Mandelbrot", id);
                &self.entries[0]
            }
        }
    }

    pub fn entries(&self) -> &[RecipeEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: ComplexPoint = ComplexPoint::new(0.0, 0.0);

    fn p(re: f64, im: f64) -> ComplexPoint {
        ComplexPoint::new(re, im)
    }

    fn close(a: ComplexPoint, b: ComplexPoint) -> bool {
        (a - b).norm() < 1e-9
    }

    fn run(id: u32, z: ComplexPoint, c: ComplexPoint) -> ComplexPoint {
        step(id, z, ORIGIN, c, 1.0, 1, ScaleMode::None).0
    }

    #[test]
    fn test_table_is_sorted_and_complete() {
        let table = RecipeTable::global();
        let ids: Vec<u32> = table.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 46);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids[0], 0);
        assert!(table.get(28).is_none());
        assert!(table.get(29).is_none());
        assert_eq!(table.get(47).map(|e| e.name), Some("Burning Ship Deep Needle"));
    }

    #[test]
    fn test_unknown_id_falls_back_to_mandelbrot() {
        let table = RecipeTable::global();
        assert_eq!(table.lookup(9999).recipe, Recipe::Mandelbrot);
        assert_eq!(table.lookup(28).id, 0);

        let z = p(0.3, -0.4);
        let c = p(-0.1, 0.7);
        assert_eq!(run(9999, z, c), run(0, z, c));
    }

    #[test]
    fn test_mandelbrot_step() {
        assert_eq!(run(0, p(1.0, 2.0), p(0.5, -0.5)), p(-2.5, 3.5));
    }

    #[test]
    fn test_conjugate_and_abs_families() {
        let z = p(-1.0, -2.0);
        // Tricorn flips the cross term
        assert_eq!(run(1, z, ORIGIN), p(-3.0, -4.0));
        // Burning Ship takes abs first
        assert_eq!(run(2, z, ORIGIN), p(-3.0, 4.0));
        // Perpendicular Mandelbrot: -2|x|y
        assert_eq!(run(3, z, ORIGIN), p(-3.0, 4.0));
        // Celtic / Buffalo: abs of the real part after squaring
        assert_eq!(run(4, z, ORIGIN), p(3.0, 4.0));
        assert_eq!(run(5, z, ORIGIN), p(3.0, -4.0));
        // Heart: 2|x|y
        assert_eq!(run(11, z, ORIGIN), p(-3.0, -4.0));
        assert_eq!(run(12, z, ORIGIN), p(3.0, 4.0));
    }

    #[test]
    fn test_phoenix_uses_previous_iterate() {
        let z = p(1.0, 0.0);
        let prev = p(2.0, 4.0);
        let (next, memory) = step(6, z, prev, ORIGIN, 1.0, 3, ScaleMode::None);
        assert_eq!(next, p(0.0, -2.0));
        assert_eq!(memory, z);
    }

    #[test]
    fn test_man_o_war_adds_previous_iterate() {
        let (next, memory) = step(27, p(1.0, 1.0), p(0.5, 0.5), ORIGIN, 1.0, 2, ScaleMode::None);
        assert_eq!(next, p(0.5, 2.5));
        assert_eq!(memory, p(1.0, 1.0));
    }

    #[test]
    fn test_inverse_mandelbrot_sign_is_positive() {
        // z = 1 + i: z² = 2i, |z|⁴ = 4
        let w = run(20, p(1.0, 1.0), ORIGIN);
        assert!(w.re.abs() < 1e-12);
        assert!((w.im - 0.5).abs() < 1e-9);
        assert!(w.im > 0.0);
    }

    #[test]
    fn test_reciprocal_square_family() {
        let z = p(1.0, 1.0);
        assert!(close(run(36, z, ORIGIN), p(0.0, 0.5)));
        assert!(close(run(37, z, ORIGIN), p(0.0, -0.5)));
        assert!(close(run(38, z, ORIGIN), p(0.0, 0.5)));

        let (next, memory) = step(39, z, p(1.0, 0.0), ORIGIN, 1.0, 1, ScaleMode::None);
        assert!(close(next, p(-0.5, 0.5)));
        assert_eq!(memory, z);
    }

    #[test]
    fn test_family_powers() {
        let table = RecipeTable::global();
        let multibrot: Vec<Recipe> = [7, 8, 14, 15, 18, 19]
            .iter()
            .map(|&id| table.lookup(id).recipe)
            .collect();
        assert_eq!(
            multibrot,
            (3..=8).map(Recipe::Multibrot).collect::<Vec<_>>()
        );
        for (id, power) in (22..=25).zip(3..=6) {
            assert_eq!(table.lookup(id).recipe, Recipe::PowerBurningShip(power));
        }
        for (id, power) in (30..=35).zip(3..=8) {
            assert_eq!(table.lookup(id).recipe, Recipe::InversePower(power));
        }
    }

    #[test]
    fn test_multibrot_cubic_matches_direct_power() {
        let z = p(0.4, 0.9);
        let c = p(-0.2, 0.1);
        assert!(close(run(7, z, c), z * z * z + c));
    }

    #[test]
    fn test_power_burning_ship_uses_abs() {
        let c = p(0.1, 0.1);
        assert!(close(run(22, p(-0.5, -0.6), c), run(22, p(0.5, 0.6), c)));
    }

    #[test]
    fn test_inverse_power_matches_reciprocal() {
        let z = p(0.8, -0.3);
        let expected = p(1.0, 0.0) / z.powu(4);
        assert!((run(31, z, ORIGIN) - expected).norm() < 1e-8);
    }

    #[test]
    fn test_transcendental_recipes_at_origin() {
        assert_eq!(run(9, ORIGIN, ORIGIN), p(1.0, 0.0));
        assert_eq!(run(10, ORIGIN, ORIGIN), p(0.0, 0.0));
        assert_eq!(run(16, ORIGIN, ORIGIN), p(0.0, 0.0));
        assert_eq!(run(17, ORIGIN, ORIGIN), p(1.0, 0.0));
    }

    #[test]
    fn test_tangent_matches_complex_tan() {
        let z = p(0.3, 0.2);
        assert!((run(16, z, ORIGIN) - z.tan()).norm() < 1e-8);
    }

    #[test]
    fn test_spiral_rotation_follows_gamma() {
        let z = p(0.5, 0.25);
        let c = p(0.1, -0.2);
        // theta = 0.35 + 2·gamma = 0 reduces to Mandelbrot
        let (flat, _) = step(13, z, ORIGIN, c, -0.175, 1, ScaleMode::None);
        assert!(close(flat, run(0, z, c)));

        let (turned, _) = step(13, z, ORIGIN, c, 0.5, 1, ScaleMode::None);
        let theta: f64 = 1.35;
        let expected = z * z * p(theta.cos(), theta.sin()) + c;
        assert!(close(turned, expected));
    }

    #[test]
    fn test_needle_recipes_reparameterize_the_constant() {
        let center = p(NEEDLE_CENTER.0, NEEDLE_CENTER.1);
        let z = p(0.2, -0.1);
        assert!(close(run(21, z, ORIGIN), run(2, z, center)));

        let deep = p(DEEP_NEEDLE_CENTER.0, DEEP_NEEDLE_CENTER.1);
        let c = p(1.0, 1.0);
        assert!(close(run(47, z, c), run(2, z, deep + c * DEEP_NEEDLE_SHRINK)));
    }

    #[test]
    fn test_nova_root_is_fixed_point() {
        let one = p(1.0, 0.0);
        assert_eq!(run(26, one, ORIGIN), one);
        assert_eq!(run(41, one, ORIGIN), one);
        assert_eq!(run(44, one, ORIGIN), one);
    }

    #[test]
    fn test_tri_nova_variants() {
        let z = p(0.6, 0.2);
        let c = p(0.05, 0.0);
        let tri = z * (4.0 / 3.0) - z.powu(4) / 3.0 + c;
        assert!(close(run(40, z, c), tri));
        assert!((run(43, z, c) - p(1.0, 0.0) / tri).norm() < 1e-7);

        let w = p(1.0, 0.0) / z;
        let inner = w * (4.0 / 3.0) - w.powu(4) / 3.0 + c;
        assert!((run(42, z, c) - p(1.0, 0.0) / inner).norm() < 1e-7);
    }

    #[test]
    fn test_flower_and_scatter_reseed_on_first_step() {
        let c = p(0.5, 0.2);
        let junk = p(9.0, -9.0);
        for id in [45, 46] {
            let (first, _) = step(id, junk, ORIGIN, c, 1.0, 0, ScaleMode::None);
            let (from_c, _) = step(id, c, ORIGIN, c, 1.0, 1, ScaleMode::None);
            assert_eq!(first, from_c);
        }
        let quartic = run(44, c, c);
        assert_eq!(run(45, c, c), -quartic);
    }

    #[test]
    fn test_step_origin_follows_reseed() {
        let table = RecipeTable::global();
        let c = p(0.5, 0.2);
        let z = p(9.0, -9.0);
        for id in [45, 46] {
            let recipe = &table.lookup(id).recipe;
            assert_eq!(recipe.step_origin(z, c, 0), c);
            assert_eq!(recipe.step_origin(z, c, 1), z);
        }
        assert_eq!(table.lookup(44).recipe.step_origin(z, c, 0), z);
    }

    #[test]
    fn test_seed_rules() {
        let table = RecipeTable::global();
        assert_eq!(table.lookup(0).seed, Seed::Origin);
        assert_eq!(table.lookup(26).seed, Seed::UnitReal);
        assert_eq!(table.lookup(41).seed, Seed::Origin);
        assert_eq!(table.lookup(45).seed, Seed::UnitReal);
        assert_eq!(table.lookup(33).seed, Seed::Constant);
        assert_eq!(table.lookup(39).seed, Seed::Constant);
        assert_eq!(table.lookup(9999).seed, Seed::Origin);

        let c = p(0.3, 0.4);
        assert_eq!(Seed::Constant.initial(c), c);
        assert_eq!(Seed::UnitReal.initial(c), p(1.0, 0.0));
    }

    #[test]
    fn test_convergent_family() {
        let table = RecipeTable::global();
        let convergent: Vec<u32> = table
            .entries()
            .iter()
            .filter(|e| e.recipe.is_convergent())
            .map(|e| e.id)
            .collect();
        assert_eq!(convergent, vec![26, 40, 41, 42, 43, 44, 45, 46]);
    }

    #[test]
    fn test_effective_constant_scaling() {
        let c = p(1.0, 1.0);
        // s = 1 + 3·(2 - 1) = 4
        assert_eq!(effective_constant(c, 2.0, 3, ScaleMode::None), c);
        assert_eq!(effective_constant(c, 2.0, 3, ScaleMode::Multiply), p(4.0, 4.0));
        assert_eq!(effective_constant(c, 2.0, 3, ScaleMode::Divide), p(0.25, 0.25));
        // gamma = 1 leaves s at 1 on every step
        assert_eq!(effective_constant(c, 1.0, 50, ScaleMode::Divide), c);
    }

    #[test]
    fn test_scale_mode_codes() {
        assert_eq!(ScaleMode::try_from(0), Ok(ScaleMode::None));
        assert_eq!(ScaleMode::try_from(1), Ok(ScaleMode::Multiply));
        assert_eq!(ScaleMode::try_from(2), Ok(ScaleMode::Divide));
        assert_eq!(ScaleMode::try_from(7), Err(7));
    }
}
