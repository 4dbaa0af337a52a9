mod post_install;

pub use post_install::install_payload;
