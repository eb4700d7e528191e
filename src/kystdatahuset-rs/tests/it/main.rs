mod login;
mod lookup;
mod positions;
