mod comments;
mod settings;
