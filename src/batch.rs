//! Building symbols from raw input and extracting features in bulk.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::FeatureConfig;
use crate::error::FeatureError;
use crate::stroke::Stroke;
use crate::symbol::{Label, Symbol};

/// Raw symbol as delivered by a stroke source: one `[x, y]` list per stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInput {
    pub id: u32,
    #[serde(default)]
    pub truth: Option<String>,
    pub strokes: Vec<Vec<[f64; 2]>>,
}

/// Build, preprocess and normalize one symbol.
///
/// Strokes get ids from their position in the input.
pub fn prepare_symbol(input: &SymbolInput) -> Result<Symbol, FeatureError> {
    let strokes = input
        .strokes
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let xy: Vec<(f64, f64)> = raw.iter().map(|&[x, y]| (x, y)).collect();
            let mut stroke = Stroke::from_xy(i as u32, &xy)?;
            stroke.preprocess();
            Ok(stroke)
        })
        .collect::<Result<Vec<_>, FeatureError>>()?;

    let mut symbol = Symbol::new(input.id, strokes, Label::from(input.truth.clone()))?;
    symbol.normalize();
    Ok(symbol)
}

/// Prepare every input in parallel. Output order matches input order.
pub fn prepare_batch(inputs: &[SymbolInput]) -> Vec<Result<Symbol, FeatureError>> {
    inputs.par_iter().map(prepare_symbol).collect()
}

/// Feature vectors of already prepared symbols, in parallel.
///
/// `config` is validated once for the whole slice.
pub fn extract_features(
    symbols: &[Symbol],
    config: &FeatureConfig,
) -> Result<Vec<Vec<f64>>, FeatureError> {
    config.validate()?;
    Ok(symbols.par_iter().map(|s| s.feature_vector(config)).collect())
}

/// Prepare and extract every input in parallel.
///
/// A failing symbol only fails its own entry. Output order matches input
/// order.
pub fn extract_batch(
    inputs: &[SymbolInput],
    config: &FeatureConfig,
) -> Result<Vec<Result<Vec<f64>, FeatureError>>, FeatureError> {
    config.validate()?;
    let t_start = Instant::now();

    let results: Vec<_> = inputs
        .par_iter()
        .map(|input| prepare_symbol(input).map(|s| s.feature_vector(config)))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    log::info!(
        "extracted {} symbols ({} failed), {} features each, {}ms",
        results.len() - failed,
        failed,
        config.len(),
        t_start.elapsed().as_millis(),
    );
    Ok(results)
}

/// Set every symbol's size ratio against the average original size.
///
/// Used when the symbols come from the same page or expression.
pub fn assign_size_ratios(symbols: &mut [Symbol]) {
    if symbols.is_empty() {
        return;
    }
    let n = symbols.len() as f64;
    let avg_width = symbols.iter().map(|s| s.original_box().width()).sum::<f64>() / n;
    let avg_height = symbols.iter().map(|s| s.original_box().height()).sum::<f64>() / n;
    for symbol in symbols {
        symbol.set_size_ratio(avg_width, avg_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: u32, strokes: Vec<Vec<[f64; 2]>>) -> SymbolInput {
        SymbolInput {
            id,
            truth: Some("a".into()),
            strokes,
        }
    }

    #[test]
    fn prepare_normalizes() {
        let symbol = prepare_symbol(&input(
            1,
            vec![vec![[10.0, 10.0], [20.0, 15.0], [30.0, 10.0]]],
        ))
        .unwrap();
        assert!(symbol.is_normalized());
        let b = symbol.bounds();
        assert!(b.x0 >= -1.0 && b.x1 <= 1.0 && b.y0 >= -1.0 && b.y1 <= 1.0);
        assert_eq!(symbol.truth(), &Label::Known("a".into()));
    }

    #[test]
    fn batch_isolates_failures() {
        let inputs = vec![
            input(0, vec![vec![[0.0, 0.0], [1.0, 1.0]]]),
            input(1, vec![]),
            input(2, vec![vec![[0.0, 0.0]], vec![]]),
            input(3, vec![vec![[0.0, 0.0], [1.0, 0.0]], vec![[0.5, -1.0], [0.5, 1.0]]]),
        ];
        let config = FeatureConfig::default();
        let results = extract_batch(&inputs, &config).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().len(), config.len());
        assert_eq!(results[1], Err(FeatureError::EmptySymbol));
        assert!(matches!(
            results[2],
            Err(FeatureError::MalformedStroke { stroke: 1, .. })
        ));
        assert_eq!(results[3].as_ref().unwrap().len(), config.len());
    }

    #[test]
    fn batch_rejects_bad_config() {
        let config = FeatureConfig {
            crossings: 0,
            ..FeatureConfig::default()
        };
        assert!(matches!(
            extract_batch(&[], &config),
            Err(FeatureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn prepared_extraction_rejects_bad_config() {
        let symbol = prepare_symbol(&input(0, vec![vec![[0.0, 0.0], [1.0, 2.0]]])).unwrap();
        let symbols = vec![symbol];
        let config = FeatureConfig {
            use_point_angular: true,
            angular_bins: 0,
            ..FeatureConfig::default()
        };
        assert!(matches!(
            extract_features(&symbols, &config),
            Err(FeatureError::InvalidConfig(_))
        ));
        let features = extract_features(&symbols, &FeatureConfig::all()).unwrap();
        assert_eq!(features[0].len(), FeatureConfig::all().len());
    }

    #[test]
    fn size_ratios_against_average() {
        let mut symbols: Vec<Symbol> = [
            input(0, vec![vec![[0.0, 0.0], [2.0, 1.0]]]),
            input(1, vec![vec![[0.0, 0.0], [4.0, 3.0]]]),
        ]
        .iter()
        .map(|i| prepare_symbol(i).unwrap())
        .collect();
        assign_size_ratios(&mut symbols);
        assert_eq!(symbols[0].size_ratio(), (2.0 / 3.0, 0.5));
        assert_eq!(symbols[1].size_ratio(), (4.0 / 3.0, 1.5));
    }

    #[test]
    fn input_from_json() {
        let input: SymbolInput =
            serde_json::from_str(r#"{ "id": 4, "strokes": [[[0, 0], [1, 2]]] }"#).unwrap();
        assert_eq!(input.truth, None);
        assert_eq!(input.strokes[0][1], [1.0, 2.0]);
    }
}
