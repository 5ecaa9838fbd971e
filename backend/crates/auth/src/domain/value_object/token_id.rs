use kernel::id::Id;

pub struct PersonalAccessTokenMarker;
pub type TokenId = Id<PersonalAccessTokenMarker>;
