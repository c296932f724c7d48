use bevy::prelude::*;
use fieldnav::components::MoveState;
use fieldnav::game_logic::errors::{NavError, NavResult};

/// Generic parser for delimited strings that return fixed-size arrays
pub fn parse_delimited<T, const N: usize>(
    input: &str,
    delimiter: char,
    type_name: &str,
    parser: impl Fn(&str) -> Result<T, std::num::ParseFloatError>,
) -> NavResult<[T; N]>
where
    T: Copy + Default,
{
    let parts: Vec<&str> = input.split(delimiter).map(str::trim).collect();
    if parts.len() != N {
        return Err(NavError::InvalidSceneData {
            reason: format!(
                "Invalid {type_name} format '{input}'. Expected {N} {delimiter}-separated values"
            ),
        });
    }

    let mut result = [T::default(); N];
    for (i, part) in parts.iter().enumerate() {
        result[i] = parser(part).map_err(|_| NavError::InvalidSceneData {
            reason: format!("Invalid {type_name} value: '{part}'"),
        })?;
    }

    Ok(result)
}

/// Parse a point string "X,Y"
pub fn parse_point(point_str: &str) -> NavResult<Vec2> {
    let [x, y] = parse_delimited::<f32, 2>(point_str, ',', "point", |s| s.parse())?;
    let point = Vec2::new(x, y);
    if !point.is_finite() {
        return Err(NavError::InvalidSceneData {
            reason: format!("Point '{point_str}' is not finite"),
        });
    }
    Ok(point)
}

pub fn moving_state(run: bool) -> MoveState {
    if run {
        MoveState::Running
    } else {
        MoveState::Walking
    }
}
