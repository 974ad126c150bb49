use std::path::Path;

/// Image formats the scanner is hunting for.
///
/// The extension table is the single source of truth for what
/// counts as an image. It's a closed set on purpose.
#[ derive( Debug ) ]
#[ derive( Clone, Copy, PartialEq, Eq ) ]
#[ derive( strum::EnumIter ) ]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
}

impl ImageFormat {
    /// Extensions of each image format.
    #[ inline ]
    #[ must_use ]
    pub fn exts( &self ) -> &'static [ &'static str ] {
        match self {
            Self::Jpeg => &[ "jpg", "jpeg" ],
            Self::Png => &[ "png" ],
            Self::Bmp => &[ "bmp" ],
        }
    }

    /// Guess the picture's format based on the extension of the path.
    /// The comparison is case insensitive,
    /// so "photo.JPG" and "photo.jpg" are the same thing.
    #[ must_use ]
    pub fn from_path( path: &impl AsRef<Path> ) -> Option<Self> {
        use strum::IntoEnumIterator;
        let ext = path.as_ref()
            .extension()?
            .to_str()?
            .to_lowercase();
        Self::iter().find( |fmt| fmt.exts().contains( &ext.as_str() ) )
    }
}

/// Whether the entry at `path` qualifies as an image.
/// Directories are expected to be filtered out by the caller
/// beforehand.
#[ inline ]
#[ must_use ]
pub fn is_image( path: &impl AsRef<Path> ) -> bool {
    ImageFormat::from_path( path ).is_some()
}

#[ cfg( test ) ]
#[ allow( clippy::unwrap_used ) ]
mod tests {

    use super::*;

    #[ test ]
    fn known_suffixes() {
        assert!( is_image( &"photo.jpg" ) );
        assert!( is_image( &"photo.jpeg" ) );
        assert!( is_image( &"photo.png" ) );
        assert!( is_image( &"photo.bmp" ) );
    }

    #[ test ]
    fn case_insensitive() {
        assert!( is_image( &"PHOTO.JPG" ) );
        assert!( is_image( &"photo.Png" ) );
        assert!( is_image( &"a.BmP" ) );
    }

    #[ test ]
    fn unknown_suffixes() {
        assert!( !is_image( &"photo.gif" ) );
        assert!( !is_image( &"photo" ) );
        assert!( !is_image( &"photo.jpg.txt" ) );
        assert!( !is_image( &"jpg" ) );
    }

    #[ test ]
    fn format_of_path() {
        assert_eq!(
            ImageFormat::from_path( &"some/dir/a.JPEG" ),
            Some( ImageFormat::Jpeg )
        );
        assert_eq!( ImageFormat::from_path( &"a.webp" ), None );
    }
}
