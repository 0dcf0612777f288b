//! Entry point for maximizing a [`LogLikelihood`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize `ℓ(θ)` with L-BFGS, starting from `theta0`.
///
/// The starting point is validated with [`LogLikelihood::check`], the model is
/// wrapped so argmin minimizes `-ℓ(θ)`, and the line search named in
/// `opts.line_searcher` drives the solver.
///
/// # Errors
/// - Anything `check` rejects.
/// - Solver construction or runtime failures, as [`OptError`].
///
/// [`OptError`]: crate::optimization::errors::OptError
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_causalimpact::optimization::errors::OptResult;
/// use rust_causalimpact::optimization::loglik_optimizer::{
///     maximize, LogLikelihood, MLEOptions, Theta,
/// };
///
/// struct Bowl;
/// impl LogLikelihood for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Bowl, array![0.3, -0.2], &(), &MLEOptions::default())?;
/// assert!(out.value <= 0.0);
/// # Ok::<(), rust_causalimpact::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    log::debug!(
        "maximize: dim = {}, line search = {:?}, max_iter = {:?}",
        theta0.len(),
        opts.line_searcher,
        opts.tols.max_iter
    );
    let problem = ArgMinAdapter::new(f, data);
    let outcome = match opts.line_searcher {
        LineSearcher::MoreThuente => {
            run_lbfgs(theta0, opts, problem, build_optimizer_more_thuente(opts)?)
        }
        LineSearcher::HagerZhang => {
            run_lbfgs(theta0, opts, problem, build_optimizer_hager_zhang(opts)?)
        }
    }?;
    log::debug!(
        "maximize: status = {}, iterations = {}, ell = {:.6}",
        outcome.status,
        outcome.iterations,
        outcome.value
    );
    Ok(outcome)
}
