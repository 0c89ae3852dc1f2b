pub mod mesh_helper;
