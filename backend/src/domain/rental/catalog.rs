//! Closed vocabularies used to describe addresses and bikes.
//!
//! Each enum serialises as its SCREAMING_SNAKE_CASE name (which is also the
//! database representation) and displays its human-readable description.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a name does not match any enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    /// Vocabulary the value was parsed against, e.g. `color`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! define_catalog {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => ($code:literal, $description:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable SCREAMING_SNAKE_CASE name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// Human-readable description.
            #[must_use]
            pub const fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.description())
            }
        }
    };
}

define_catalog! {
    /// Cities where storages can be located.
    City ("city") {
        Moscow => ("MOSCOW", "Москва"),
        SaintPetersburg => ("SAINT_PETERSBURG", "Санкт-Петербург"),
        Ekaterinburg => ("EKATERINBURG", "Екатеринбург"),
        NizhnyNovgorod => ("NIZHNY_NOVGOROD", "Нижний Новгород"),
        Krasnodar => ("KRASNODAR", "Краснодар"),
        Novosibirsk => ("NOVOSIBIRSK", "Новосибирск"),
    }
}

define_catalog! {
    /// Frame colours.
    Color ("color") {
        White => ("WHITE", "Белый"),
        Grey => ("GREY", "Серый"),
        Black => ("BLACK", "Черный"),
        Red => ("RED", "Красный"),
        Orange => ("ORANGE", "Оранжевый"),
        Yellow => ("YELLOW", "Желтый"),
        Green => ("GREEN", "Зеленый"),
        Blue => ("BLUE", "Синий"),
        Violet => ("VIOLET", "Фиолетовый"),
    }
}

define_catalog! {
    /// Frame sizes.
    Size ("size") {
        Xs => ("XS", "Frame size 13\"-14\""),
        S => ("S", "Frame size 15\"-16\""),
        M => ("M", "Frame size 17\"-18\""),
        L => ("L", "Frame size 19\"-20\""),
        Xl => ("XL", "Frame size 21\"-22\""),
        Xxl => ("XXL", "Frame size 23\"-24\""),
    }
}

define_catalog! {
    /// Bike manufacturers.
    Label ("label") {
        GiantBicycle => ("GIANT_BICYCLE", "Giant Bicycle"),
        TrekBicycle => ("TREK_BICYCLE", "Trek Bicycle"),
        Scott => ("SCOTT", "Scott"),
        Salsa => ("SALSA", "Salsa"),
        Cannondale => ("CANNONDALE", "Cannondale"),
        Fuji => ("FUJI", "Fuji"),
        Mongoose => ("MONGOOSE", "Mongoose"),
        Stels => ("STELS", "Stels"),
        Forward => ("FORWARD", "Forward"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("MOSCOW", City::Moscow)]
    #[case("NIZHNY_NOVGOROD", City::NizhnyNovgorod)]
    fn city_parses_from_name(#[case] name: &str, #[case] expected: City) {
        assert_eq!(name.parse::<City>(), Ok(expected));
    }

    #[rstest]
    fn unknown_name_reports_vocabulary() {
        let err = "PINK".parse::<Color>().expect_err("PINK is not a colour");
        assert_eq!(err.kind(), "color");
        assert_eq!(err.to_string(), "unknown color `PINK`");
    }

    #[rstest]
    fn names_survive_serde_and_as_str() {
        for label in Label::ALL {
            let json = serde_json::to_value(label).expect("serialise label");
            assert_eq!(json, serde_json::json!(label.as_str()));
        }
    }

    #[rstest]
    fn display_uses_description() {
        assert_eq!(Label::Stels.to_string(), "Stels");
        assert_eq!(Size::L.to_string(), "Frame size 19\"-20\"");
    }
}
