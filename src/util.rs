use enum_map::Enum;
use enum_map::EnumArray;
use enum_map::EnumMap;

pub fn enum_iter<E>() -> impl Iterator<Item = E>
where
    E: Enum,
{
    (0..E::LENGTH).map(|i| E::from_usize(i))
}

pub mod color {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Color(pub u8, pub u8, pub u8);

    pub const WHITE: Color = Color(255, 255, 255);
    pub const YELLOW: Color = Color(255, 255, 0);
    pub const RED: Color = Color(255, 0, 0);
    pub const ORANGE: Color = Color(255, 128, 0);
    pub const BLUE: Color = Color(0, 0, 255);
    pub const GREEN: Color = Color(0, 255, 0);
    /// Interior faces of a cubelet.
    pub const BLACK: Color = Color(17, 17, 17);
}

/// Serializes an `EnumMap` as a list of values in enum order, so keys that
/// are not strings still survive a trip through JSON.
pub mod enum_map_serde {
    use super::*;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<K, V, S>(map: &EnumMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: EnumArray<V>,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<EnumMap<K, V>, D::Error>
    where
        K: EnumArray<V>,
        V: Deserialize<'de> + Clone,
        D: Deserializer<'de>,
    {
        let values = Vec::<V>::deserialize(deserializer)?;
        if values.len() != K::LENGTH {
            return Err(D::Error::invalid_length(
                values.len(),
                &"one value per enum variant",
            ));
        }
        Ok(EnumMap::from_fn(|key: K| values[key.into_usize()].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Enum, Clone, Copy, PartialEq, Eq)]
    enum Tri {
        A,
        B,
        C,
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Wrapper {
        #[serde(with = "enum_map_serde")]
        map: EnumMap<Tri, u32>,
    }

    #[test]
    fn enum_iter_visits_every_variant_in_order() {
        assert_eq!(enum_iter::<Tri>().collect::<Vec<_>>(), vec![Tri::A, Tri::B, Tri::C]);
    }

    #[test]
    fn enum_map_serde_uses_enum_order() {
        let wrapper = Wrapper {
            map: EnumMap::from_fn(|t: Tri| t.into_usize() as u32 * 10),
        };
        let json = serde_json::to_string(&wrapper).unwrap();
        assert_eq!(json, r#"{"map":[0,10,20]}"#);
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wrapper);
    }

    #[test]
    fn enum_map_serde_rejects_wrong_length() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"map":[1,2]}"#).is_err());
    }
}
