//! Serde adapters for wrapped element lists such as `<urls><url/></urls>`.
//!
//! The wrapper element carries no data of its own, so the model exposes the
//! inner entries as a plain `Vec` and these adapters add or strip the wrapper.

macro_rules! wrapped_list {
    ($module:ident, $item:ty, $child:literal) => {
        pub(crate) mod $module {
            use serde::{Deserialize, Deserializer, Serialize, Serializer};

            #[derive(Serialize)]
            struct Wrapper<'a> {
                #[serde(rename = $child)]
                entries: &'a [$item],
            }

            #[derive(Deserialize)]
            struct OwnedWrapper {
                #[serde(rename = $child, default)]
                entries: Vec<$item>,
            }

            pub(crate) fn serialize<S>(entries: &[$item], serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                Wrapper { entries }.serialize(serializer)
            }

            pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<$item>, D::Error>
            where
                D: Deserializer<'de>,
            {
                OwnedWrapper::deserialize(deserializer).map(|wrapper| wrapper.entries)
            }
        }
    };
}

wrapped_list!(urls, crate::Url, "url");
wrapped_list!(packages, crate::Package, "package");
wrapped_list!(actions, crate::Action, "action");
