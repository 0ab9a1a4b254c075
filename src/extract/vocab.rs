//! Closed key vocabularies for the three metadata namespaces.
//!
//! Each vocabulary is a plain enum whose variants map 1:1 onto literal
//! tag keys. Serialization goes through the literals (`"og:title"`,
//! `"twitter:card"`, `"description"`), so typed maps keep the wire
//! shape of the tags they were read from.

/// Generates a vocabulary enum with key lookup, `Display`, and serde
/// impls that use the literal key strings.
macro_rules! vocab {
    (
        $(#[$outer:meta])*
        $name:ident {
            $($variant:ident => $key:literal,)+
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// The tag key this member is read from and serialized as.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }

            /// Exact, case-sensitive lookup from a tag key.
            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let key = <String as serde::Deserialize>::deserialize(deserializer)?;
                $name::from_key(&key).ok_or_else(|| {
                    serde::de::Error::custom(format_args!(
                        concat!("unknown ", stringify!($name), " key `{}`"),
                        key
                    ))
                })
            }
        }
    };
}

vocab! {
    /// Standard `<meta name>` keys, plus `canonical` which is read from
    /// `<link rel="canonical">` rather than a meta tag.
    MetaTagKind {
        Description => "description",
        Keywords => "keywords",
        Author => "author",
        Canonical => "canonical",
        Robots => "robots",
    }
}

vocab! {
    /// Open Graph `<meta property>` keys across the `og:`, `article:`,
    /// `profile:` and `book:` namespaces.
    OpenGraphKind {
        Title => "og:title",
        Description => "og:description",
        Type => "og:type",
        Url => "og:url",
        SiteName => "og:site_name",
        Locale => "og:locale",
        LocaleAlternate => "og:locale:alternate",
        Image => "og:image",
        ImageSecureUrl => "og:image:secure_url",
        ImageType => "og:image:type",
        ImageWidth => "og:image:width",
        ImageHeight => "og:image:height",
        ImageAlt => "og:image:alt",
        Audio => "og:audio",
        AudioSecureUrl => "og:audio:secure_url",
        AudioType => "og:audio:type",
        Video => "og:video",
        VideoSecureUrl => "og:video:secure_url",
        VideoType => "og:video:type",
        VideoWidth => "og:video:width",
        VideoHeight => "og:video:height",
        ArticlePublishedTime => "article:published_time",
        ArticleModifiedTime => "article:modified_time",
        ArticleExpirationTime => "article:expiration_time",
        ArticleAuthor => "article:author",
        ArticleSection => "article:section",
        ArticleTag => "article:tag",
        ProfileFirstName => "profile:first_name",
        ProfileLastName => "profile:last_name",
        ProfileUsername => "profile:username",
        ProfileGender => "profile:gender",
        BookAuthor => "book:author",
        BookIsbn => "book:isbn",
        BookReleaseDate => "book:release_date",
        BookTag => "book:tag",
    }
}

vocab! {
    /// Twitter card `<meta name>` keys.
    TwitterKind {
        Card => "twitter:card",
        Site => "twitter:site",
        SiteId => "twitter:site:id",
        Creator => "twitter:creator",
        CreatorId => "twitter:creator:id",
        Title => "twitter:title",
        Description => "twitter:description",
        Image => "twitter:image",
        ImageAlt => "twitter:image:alt",
        Player => "twitter:player",
        PlayerWidth => "twitter:player:width",
        PlayerHeight => "twitter:player:height",
        PlayerStream => "twitter:player:stream",
        AppNameIphone => "twitter:app:name:iphone",
        AppIdIphone => "twitter:app:id:iphone",
        AppUrlIphone => "twitter:app:url:iphone",
        AppNameIpad => "twitter:app:name:ipad",
        AppIdIpad => "twitter:app:id:ipad",
        AppUrlIpad => "twitter:app:url:ipad",
        AppNameGoogleplay => "twitter:app:name:googleplay",
        AppIdGoogleplay => "twitter:app:id:googleplay",
        AppUrlGoogleplay => "twitter:app:url:googleplay",
    }
}
