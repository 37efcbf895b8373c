//! TVD (strong-stability-preserving) Runge-Kutta time integration
//!
//! Stage kernels write `u_next` over a fill box only; ghost cells of every
//! stage are the caller's responsibility, because the right-hand side of the
//! next stage is evaluated on the intermediate state.
//!
//! | order | stages                                                         |
//! |-------|----------------------------------------------------------------|
//! | 1     | `u¹ = u + dt L(u)`                                             |
//! | 2     | `u¹ = u + dt L(u)`, `uⁿ⁺¹ = ½u + ½(u¹ + dt L(u¹))`             |
//! | 3     | `u¹`, `u² = ¾u + ¼(u¹ + dt L(u¹))`, `uⁿ⁺¹ = ⅓u + ⅔(u² + dt L(u²))` |
//!
//! Every stage is a convex combination of forward-Euler steps, so the order
//! 2 and 3 schemes are stable at any step size where forward Euler is.
//!
//! # References
//!
//! - Shu & Osher (1988) "Efficient implementation of essentially
//!   non-oscillatory shock-capturing schemes"

use crate::error::{LsmError, Result};
use crate::field::{Field, FieldView, FieldViewMut};
use crate::grid::{Grid, IndexBox};
use crate::options::RungeKuttaOrder;

/// `u_next = a * u_curr + (1 - a) * (u_stage + dt * rhs)` over `fill_box`,
/// evaluated as an increment on `u_stage` so that a zero right-hand side on an
/// unchanged state reproduces it bit for bit.
fn convex_stage(
    u_next: &mut FieldViewMut<'_>,
    u_curr: &FieldView<'_>,
    u_stage: &FieldView<'_>,
    rhs: &FieldView<'_>,
    fill_box: &IndexBox,
    dt: f64,
    a: f64,
) -> Result<()> {
    if !dt.is_finite() {
        return Err(LsmError::InvalidOption {
            name: "dt",
            detail: format!("time step must be finite, got {dt}"),
        });
    }
    u_next.require(fill_box)?;
    u_curr.require(fill_box)?;
    u_stage.require(fill_box)?;
    rhs.require(fill_box)?;

    for p in fill_box.points() {
        let stage = u_stage.get(p);
        let value = stage + (1.0 - a) * dt * rhs.get(p) + a * (u_curr.get(p) - stage);
        u_next.set(p, value);
    }
    Ok(())
}

/// Forward-Euler step, also the first stage of the order 2 and 3 schemes.
pub fn rk1_step(
    u_next: &mut FieldViewMut<'_>,
    u_curr: &FieldView<'_>,
    rhs: &FieldView<'_>,
    fill_box: &IndexBox,
    dt: f64,
) -> Result<()> {
    convex_stage(u_next, u_curr, u_curr, rhs, fill_box, dt, 0.0)
}

/// Second stage of TVD-RK2. `rhs` is `L(u_stage1)`.
pub fn rk2_stage2(
    u_next: &mut FieldViewMut<'_>,
    u_stage1: &FieldView<'_>,
    u_curr: &FieldView<'_>,
    rhs: &FieldView<'_>,
    fill_box: &IndexBox,
    dt: f64,
) -> Result<()> {
    convex_stage(u_next, u_curr, u_stage1, rhs, fill_box, dt, 0.5)
}

/// Second stage of TVD-RK3. `rhs` is `L(u_stage1)`.
pub fn rk3_stage2(
    u_next: &mut FieldViewMut<'_>,
    u_stage1: &FieldView<'_>,
    u_curr: &FieldView<'_>,
    rhs: &FieldView<'_>,
    fill_box: &IndexBox,
    dt: f64,
) -> Result<()> {
    convex_stage(u_next, u_curr, u_stage1, rhs, fill_box, dt, 0.75)
}

/// Third stage of TVD-RK3. `rhs` is `L(u_stage2)`.
pub fn rk3_stage3(
    u_next: &mut FieldViewMut<'_>,
    u_stage2: &FieldView<'_>,
    u_curr: &FieldView<'_>,
    rhs: &FieldView<'_>,
    fill_box: &IndexBox,
    dt: f64,
) -> Result<()> {
    convex_stage(u_next, u_curr, u_stage2, rhs, fill_box, dt, 1.0 / 3.0)
}

/// Advance `phi` by one step of size `dt` over the grid's fill box.
///
/// `rhs_op(state, rhs)` is called once per stage. It may update the ghost
/// cells of `state` (boundary conditions) before writing `L(state)` into
/// `rhs` over the fill box. Ghost cells of the result are left as they were in
/// the last stage and must be refreshed by the caller.
pub fn advance<F>(
    order: RungeKuttaOrder,
    grid: &Grid,
    phi: &mut Field,
    dt: f64,
    mut rhs_op: F,
) -> Result<()>
where
    F: FnMut(&mut Field, &mut Field) -> Result<()>,
{
    let fill_box = grid.fill_box();
    let mut rhs = Field::new(grid);

    rhs_op(phi, &mut rhs)?;
    let mut stage1 = phi.clone();
    rk1_step(
        &mut stage1.view_mut("u_stage1"),
        &phi.view("u_curr"),
        &rhs.view("rhs"),
        &fill_box,
        dt,
    )?;
    if order == RungeKuttaOrder::First {
        *phi = stage1;
        return Ok(());
    }

    rhs_op(&mut stage1, &mut rhs)?;
    let mut stage2 = stage1.clone();
    match order {
        RungeKuttaOrder::Second => {
            rk2_stage2(
                &mut stage2.view_mut("u_next"),
                &stage1.view("u_stage1"),
                &phi.view("u_curr"),
                &rhs.view("rhs"),
                &fill_box,
                dt,
            )?;
            *phi = stage2;
        }
        _ => {
            rk3_stage2(
                &mut stage2.view_mut("u_stage2"),
                &stage1.view("u_stage1"),
                &phi.view("u_curr"),
                &rhs.view("rhs"),
                &fill_box,
                dt,
            )?;
            rhs_op(&mut stage2, &mut rhs)?;
            // stage1 is no longer needed; reuse it for the result
            rk3_stage3(
                &mut stage1.view_mut("u_next"),
                &stage2.view("u_stage2"),
                &phi.view("u_curr"),
                &rhs.view("rhs"),
                &fill_box,
                dt,
            )?;
            *phi = stage1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SpatialDerivativeAccuracy;
    use approx::assert_abs_diff_eq;

    fn grid() -> Grid {
        Grid::with_cell_counts(
            2,
            &[4, 4],
            &[0.0, 0.0],
            &[1.0, 1.0],
            SpatialDerivativeAccuracy::Low,
        )
        .unwrap()
    }

    /// One step of dy/dt = -y from y = 1.
    fn decay_step(order: RungeKuttaOrder, dt: f64) -> f64 {
        let g = grid();
        let mut y = Field::filled(&g, 1.0);
        let fill = g.fill_box();
        advance(order, &g, &mut y, dt, |state, rhs| {
            for p in fill.points() {
                rhs.set(p, -state.get(p));
            }
            Ok(())
        })
        .unwrap();
        y.get(fill.lo)
    }

    #[test]
    fn test_decay_matches_truncated_taylor_series() {
        let dt = 0.1_f64;
        let taylor = [1.0 - dt, 1.0 - dt + dt * dt / 2.0, 1.0 - dt + dt * dt / 2.0 - dt.powi(3) / 6.0];
        let orders = [RungeKuttaOrder::First, RungeKuttaOrder::Second, RungeKuttaOrder::Third];
        for (order, expected) in orders.into_iter().zip(taylor) {
            assert_abs_diff_eq!(decay_step(order, dt), expected, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_error_shrinks_with_order() {
        let dt = 0.05;
        let exact = (-dt as f64).exp();
        let errors: Vec<f64> = [RungeKuttaOrder::First, RungeKuttaOrder::Second, RungeKuttaOrder::Third]
            .into_iter()
            .map(|o| (decay_step(o, dt) - exact).abs())
            .collect();
        assert!(errors[0] > errors[1] && errors[1] > errors[2]);
        assert!(errors[2] < dt.powi(4));
    }

    #[test]
    fn test_stage_writes_fill_box_only() {
        let g = grid();
        let u = Field::filled(&g, 2.0);
        let rhs = Field::filled(&g, 1.0);
        let mut next = Field::filled(&g, -7.0);
        rk1_step(
            &mut next.view_mut("u_next"),
            &u.view("u_curr"),
            &rhs.view("rhs"),
            &g.fill_box(),
            0.5,
        )
        .unwrap();
        for p in g.ghost_box().points() {
            let expected = if g.fill_box().contains(p) { 2.5 } else { -7.0 };
            assert_eq!(next.get(p), expected);
        }
    }

    #[test]
    fn test_zero_rhs_keeps_state_exactly() {
        let g = grid();
        let initial = Field::from_fn(&g, |x| 1.0435028842544403 + (3.0 * x[0]).sin() * x[1]);
        for order in [RungeKuttaOrder::First, RungeKuttaOrder::Second, RungeKuttaOrder::Third] {
            let mut phi = initial.clone();
            advance(order, &g, &mut phi, 0.1, |_, rhs| {
                rhs.fill(0.0);
                Ok(())
            })
            .unwrap();
            for p in g.fill_box().points() {
                assert_eq!(phi.get(p), initial.get(p), "{order:?} at {p:?}");
            }
        }
    }

    #[test]
    fn test_rhs_sees_every_stage() {
        let g = grid();
        let mut calls = 0;
        let mut phi = Field::new(&g);
        advance(RungeKuttaOrder::Third, &g, &mut phi, 0.1, |_, rhs| {
            calls += 1;
            rhs.fill(1.0);
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, 3);
        // constant rhs: every scheme integrates exactly
        assert_abs_diff_eq!(phi.get(g.fill_box().lo), 0.1, epsilon = 1e-15);
    }

    #[test]
    fn test_rejects_non_finite_dt() {
        let g = grid();
        let u = Field::new(&g);
        let mut next = Field::new(&g);
        assert!(rk1_step(
            &mut next.view_mut("u_next"),
            &u.view("u_curr"),
            &u.view("rhs"),
            &g.fill_box(),
            f64::NAN,
        )
        .is_err());
    }
}
