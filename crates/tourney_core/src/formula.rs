//! Configurable scoring formulas.
//!
//! Ranking-point and tie-break formulas are user-supplied expression strings
//! evaluated against named bindings. Compilation happens once at startup, so
//! a malformed formula aborts the run before any simulation.

use evalexpr::{
    build_operator_tree, ContextWithMutableFunctions, ContextWithMutableVariables, EvalexprError,
    Function, HashMapContext, Node, Value,
};

use crate::error::{Error, Result};

/// Score bindings for one team in one played match.
#[derive(Debug, Clone, Copy)]
pub struct MatchScores {
    pub own: f64,
    pub winning: f64,
    pub losing: f64,
    pub total: f64,
    pub win: bool,
    pub tie: bool,
}

/// A compiled formula over named score bindings.
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    tree: Node,
}

impl Formula {
    pub fn compile(source: &str) -> Result<Formula> {
        let tree = build_operator_tree(source)
            .map_err(|e| Error::Config(format!("invalid formula `{}`: {}", source, e)))?;
        Ok(Formula {
            source: source.to_string(),
            tree,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn eval(&self, context: &HashMapContext) -> Result<f64> {
        self.tree
            .eval_number_with_context(context)
            .map_err(|e| Error::Config(format!("formula `{}` failed: {}", self.source, e)))
    }

    /// Evaluate against the per-match bindings
    /// `OwnScore, WinningScore, LosingScore, TotalScore, Win, Tie`.
    pub fn eval_match(&self, scores: &MatchScores) -> Result<f64> {
        let mut context = HashMapContext::new();
        set(&mut context, "OwnScore", Value::Float(scores.own))?;
        set(&mut context, "WinningScore", Value::Float(scores.winning))?;
        set(&mut context, "LosingScore", Value::Float(scores.losing))?;
        set(&mut context, "TotalScore", Value::Float(scores.total))?;
        set(&mut context, "Win", Value::Boolean(scores.win))?;
        set(&mut context, "Tie", Value::Boolean(scores.tie))?;
        self.eval(&context)
    }

    /// Evaluate against a team's full list of own scores, bound as the
    /// tuple `OwnScores`, with `bestOf(OwnScores, k)` available.
    pub fn eval_score_list(&self, own_scores: &[f64]) -> Result<f64> {
        let mut context = HashMapContext::new();
        let list = Value::Tuple(own_scores.iter().map(|&s| Value::Float(s)).collect());
        set(&mut context, "OwnScores", list)?;
        context
            .set_function("bestOf".to_string(), Function::new(best_of))
            .map_err(|e| Error::Config(e.to_string()))?;
        self.eval(&context)
    }
}

fn set(context: &mut HashMapContext, name: &str, value: Value) -> Result<()> {
    context
        .set_value(name.to_string(), value)
        .map_err(|e| Error::Config(e.to_string()))
}

/// `bestOf(list, k)`: sum of the k largest values in the list.
fn best_of(argument: &Value) -> std::result::Result<Value, EvalexprError> {
    let args = argument.as_tuple()?;
    if args.len() != 2 {
        return Err(EvalexprError::CustomMessage(
            "bestOf expects (list, k)".to_string(),
        ));
    }
    let list = args[0].as_tuple()?;
    let k = args[1].as_number()?;
    if k < 0.0 {
        return Err(EvalexprError::CustomMessage(
            "bestOf count must not be negative".to_string(),
        ));
    }
    let mut values = list
        .iter()
        .map(|v| v.as_number())
        .collect::<std::result::Result<Vec<f64>, _>>()?;
    values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Value::Float(values.iter().take(k as usize).sum()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(own: f64, winning: f64, losing: f64, win: bool, tie: bool) -> MatchScores {
        MatchScores {
            own,
            winning,
            losing,
            total: winning + losing,
            win,
            tie,
        }
    }

    #[test]
    fn compile_rejects_garbage() {
        assert!(Formula::compile("OwnScore +* 2").is_err());
    }

    #[test]
    fn default_rp_formula_awards_2_1_0() {
        let f = Formula::compile("if(Win, 2, if(Tie, 1, 0))").unwrap();
        assert_eq!(f.eval_match(&scores(120.0, 120.0, 100.0, true, false)).unwrap(), 2.0);
        assert_eq!(f.eval_match(&scores(100.0, 120.0, 100.0, false, false)).unwrap(), 0.0);
        assert_eq!(f.eval_match(&scores(90.0, 90.0, 90.0, false, true)).unwrap(), 1.0);
    }

    #[test]
    fn arithmetic_over_bindings() {
        let f = Formula::compile("OwnScore + LosingScore").unwrap();
        assert_eq!(f.eval_match(&scores(120.0, 120.0, 100.0, true, false)).unwrap(), 220.0);

        let f = Formula::compile("TotalScore / 2").unwrap();
        assert_eq!(f.eval_match(&scores(120.0, 120.0, 100.0, true, false)).unwrap(), 110.0);
    }

    #[test]
    fn unknown_variable_is_an_error() {
        let f = Formula::compile("Bogus + 1").unwrap();
        assert!(f.eval_match(&scores(1.0, 1.0, 0.0, true, false)).is_err());
    }

    #[test]
    fn best_of_sums_the_k_largest() {
        let f = Formula::compile("bestOf(OwnScores, 2)").unwrap();
        assert_eq!(f.eval_score_list(&[5.0, 1.0, 9.0, 7.0]).unwrap(), 16.0);

        // k larger than the list falls back to the full sum
        let f = Formula::compile("bestOf(OwnScores, 10)").unwrap();
        assert_eq!(f.eval_score_list(&[5.0, 1.0]).unwrap(), 6.0);
    }

    #[test]
    fn score_list_formulas_compose() {
        let f = Formula::compile("bestOf(OwnScores, 3) / 3").unwrap();
        assert_eq!(f.eval_score_list(&[30.0, 60.0, 90.0, 10.0]).unwrap(), 60.0);
    }
}
