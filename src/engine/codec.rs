//! Mapping between genomes and parameter assignments.
//!
//! A genome is a fixed-length list of values laid out in search-space order.
//! Genomes are built directly from candidate draws, so only decoding is needed.

use crate::schema::{Assignment, ParamValue, SearchSpace};

/// Number of genes in every genome for `space`.
pub fn genome_len(space: &SearchSpace) -> usize {
    space.len()
}

/// Decode genes into a named parameter assignment.
///
/// Integral floats are collapsed to integers on the way out.
pub fn decode(space: &SearchSpace, genes: &[ParamValue]) -> Assignment {
    debug_assert_eq!(genes.len(), genome_len(space), "genome length mismatch");

    let mut assignment = Assignment::with_capacity(genes.len());
    for (param, gene) in space.params().iter().zip(genes) {
        assignment.push(param.name.clone(), gene.normalized());
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mixed_types() {
        let space = SearchSpace::new()
            .with_param("a", [1, 2, 3])
            .with_param("b", ["x", "y"]);
        let genes = vec![ParamValue::Int(2), ParamValue::from("y")];

        let assignment = decode(&space, &genes);
        assert_eq!(assignment.get("a"), Some(&ParamValue::Int(2)));
        assert_eq!(assignment.get("b"), Some(&ParamValue::from("y")));
        assert_eq!(genome_len(&space), 2);
    }

    #[test]
    fn test_decode_collapses_integral_floats() {
        let space = SearchSpace::new()
            .with_param("n_estimators", [10.0, 100.0])
            .with_param("learning_rate", [0.1, 1.0]);
        let genes = vec![ParamValue::Float(100.0), ParamValue::Float(0.1)];

        let assignment = decode(&space, &genes);
        assert_eq!(assignment.get("n_estimators"), Some(&ParamValue::Int(100)));
        assert_eq!(assignment.get("learning_rate"), Some(&ParamValue::Float(0.1)));

        let names: Vec<&str> = assignment.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["n_estimators", "learning_rate"]);
    }
}
